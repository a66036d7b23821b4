//! Generic visibility toggle.
//!
//! ```text
//! PATCH /api/updateVisibility {"id","type","visibleOnHome"?,"visibleOnCatalog"?}
//! ```
//!
//! `type` is one of `courses`, `components` or `products`.

use actix_web::{HttpResponse, patch, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, ResourceKind, VisibilityPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::BearerAuth;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Body of `PATCH /api/updateVisibility`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisibilityRequest {
    /// Record id; courses also accept their slug.
    pub id: Option<String>,
    /// `courses`, `components` or `products`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub visible_on_home: Option<bool>,
    pub visible_on_catalog: Option<bool>,
}

fn parse_kind(raw: &str) -> Result<ResourceKind, Error> {
    serde_json::from_value(json!(raw.trim())).map_err(|_| {
        Error::invalid_request(format!(
            "type must be courses, components, or products (got '{raw}')"
        ))
        .with_details(json!({ "field": "type" }))
    })
}

/// Set visibility flags on a course, component or product.
#[utoipa::path(
    patch,
    path = "/api/updateVisibility",
    request_body = UpdateVisibilityRequest,
    responses(
        (status = 200, description = "Updated record of the requested type"),
        (status = 400, description = "Missing id or type, unknown type, or empty patch", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "No such record", body = ErrorSchema)
    ),
    tags = ["visibility"],
    operation_id = "updateVisibility"
)]
#[patch("/updateVisibility")]
pub async fn update_visibility(
    state: web::Data<HttpState>,
    _auth: BearerAuth,
    payload: web::Json<UpdateVisibilityRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let (Some(id), Some(kind)) = (
        body.id.filter(|id| !id.trim().is_empty()),
        body.kind.filter(|kind| !kind.trim().is_empty()),
    ) else {
        return Err(Error::invalid_request("ID and type are required"));
    };
    let kind = parse_kind(&kind)?;
    let patch = VisibilityPatch {
        visible_on_home: body.visible_on_home,
        visible_on_catalog: body.visible_on_catalog,
    };

    let response = match kind {
        ResourceKind::Courses => {
            HttpResponse::Ok().json(state.courses.update_visibility(&id, &patch).await?)
        }
        ResourceKind::Components => HttpResponse::Ok().json(
            state
                .catalogue
                .update_component_visibility(&id, &patch)
                .await?,
        ),
        ResourceKind::Products => HttpResponse::Ok().json(
            state
                .catalogue
                .update_product_visibility(&id, &patch)
                .await?,
        ),
    };
    Ok(response)
}
