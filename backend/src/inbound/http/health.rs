//! Liveness and readiness checks.
//!
//! ```text
//! GET /health/ready   200 once startup finished, 503 before
//! GET /health/live    200 until shutdown begins, 503 after
//! ```
//!
//! Both checks answer with `Cache-Control: no-store` and a small JSON body.
//! Degraded dependencies (in-memory persistence, missing object storage) do
//! not fail readiness; they are listed so operators can spot them.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;

/// Shared health state, registered as `web::Data<HealthState>`.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    degraded: RwLock<Vec<String>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            degraded: RwLock::new(Vec::new()),
        }
    }
}

/// Health check response body.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthReport {
    /// `ok` or `unavailable`.
    #[schema(example = "ok")]
    pub status: &'static str,
    /// Dependencies running in a fallback mode.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

impl HealthState {
    /// Not ready, alive, nothing degraded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Startup finished; readiness checks succeed from now on.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Shutdown began; liveness checks fail from now on.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Record a dependency running in a fallback mode.
    pub fn note_degraded(&self, reason: impl Into<String>) {
        if let Ok(mut degraded) = self.degraded.write() {
            degraded.push(reason.into());
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn report(&self, healthy: bool) -> HttpResponse {
        let degraded = self
            .degraded
            .read()
            .map(|list| list.clone())
            .unwrap_or_default();
        let mut response = if healthy {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(HealthReport {
                status: if healthy { "ok" } else { "unavailable" },
                degraded,
            })
    }
}

/// Readiness check.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Ready to serve traffic", body = HealthReport),
        (status = 503, description = "Still starting", body = HealthReport)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.report(state.is_ready())
}

/// Liveness check. Call [`HealthState::mark_unhealthy`] before a graceful
/// shutdown so load balancers drain the instance early.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive", body = HealthReport),
        (status = 503, description = "Shutting down", body = HealthReport)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.report(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    async fn fetch(state: web::Data<HealthState>, uri: &str) -> (StatusCode, Option<String>, Value) {
        let app = actix_test::init_service(App::new().app_data(state).service(ready).service(live)).await;
        let response = actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
        let status = response.status();
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = actix_test::read_body(response).await;
        (status, cache, serde_json::from_slice(&body).expect("json body"))
    }

    #[rstest]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, StatusCode::OK)]
    #[actix_web::test]
    async fn readiness_follows_startup(#[case] started: bool, #[case] expected: StatusCode) {
        let state = web::Data::new(HealthState::new());
        if started {
            state.mark_ready();
        }
        let (status, cache, _) = fetch(state, "/health/ready").await;
        assert_eq!(status, expected);
        assert_eq!(cache.as_deref(), Some("no-store"));
    }

    #[actix_web::test]
    async fn liveness_fails_after_shutdown_begins() {
        let state = web::Data::new(HealthState::new());
        let (status, _, _) = fetch(state.clone(), "/health/live").await;
        assert_eq!(status, StatusCode::OK);

        state.mark_unhealthy();
        let (status, _, body) = fetch(state, "/health/live").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }

    #[actix_web::test]
    async fn degraded_dependencies_are_listed_but_do_not_fail_readiness() {
        let state = web::Data::new(HealthState::new());
        state.note_degraded("storage not configured");
        state.mark_ready();

        let (status, _, body) = fetch(state, "/health/ready").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["degraded"], serde_json::json!(["storage not configured"]));
    }
}
