//! Cross-origin policy for the admin dashboard and storefront.
//!
//! With no configured origins every origin is accepted, matching a
//! development setup where the dashboard is opened from disk or a dev
//! server. Preflight requests are answered by the middleware itself and
//! [`preflight_no_content`] turns their status into `204 No Content`.

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::{Method, StatusCode, header};
use actix_web::middleware::Next;
use tracing::warn;

/// Seconds browsers may cache a preflight answer.
const PREFLIGHT_MAX_AGE: usize = 3600;

/// Build the CORS middleware for `allowed_origins`.
#[must_use]
pub fn cors_policy(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::HeaderName::from_static(crate::domain::TRACE_ID_HEADER)])
        .max_age(PREFLIGHT_MAX_AGE);

    let origins: Vec<&str> = allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .collect();
    if origins.is_empty() {
        warn!("no CORS origins configured; accepting any origin");
        return cors.allow_any_origin();
    }
    origins
        .into_iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

fn is_preflight(req: &ServiceRequest) -> bool {
    req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Answer successful preflights with `204 No Content`.
///
/// Register with `middleware::from_fn` outside [`cors_policy`].
pub async fn preflight_no_content(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let preflight = is_preflight(&req);
    let mut response = next.call(req).await?;
    if preflight && response.status() == StatusCode::OK {
        *response.response_mut().status_mut() = StatusCode::NO_CONTENT;
    }
    Ok(response)
}
