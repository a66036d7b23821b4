//! Standalone file upload.
//!
//! ```text
//! POST /api/upload   multipart: file, folder?
//! ```

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::Serialize;
use serde_json::json;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::BearerAuth;
use crate::inbound::http::form::FormData;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Body returned after a successful upload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(example = "File uploaded successfully")]
    pub message: &'static str,
    /// Public URL of the stored object.
    #[schema(example = "https://storage.googleapis.com/bucket/uploads/1700000000000-cover.png")]
    pub url: String,
}

/// Store the `file` part under `folder` (default `uploads`).
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data", description = "`file` part plus optional `folder` text field"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "No file provided", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 413, description = "Body too large", body = ErrorSchema),
        (status = 500, description = "Storage unavailable or upload failed", body = ErrorSchema)
    ),
    tags = ["media"],
    operation_id = "uploadFile"
)]
#[post("/upload")]
pub async fn upload_file(
    state: web::Data<HttpState>,
    _auth: BearerAuth,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let mut form = FormData::read(&req, payload, state.options.max_upload_bytes).await?;
    let file = form.take_file("file").ok_or_else(|| {
        Error::invalid_request("No file provided").with_details(json!({ "field": "file" }))
    })?;
    let folder = form.text("folder");
    let url = state.media.upload(file, folder.as_deref()).await?;
    Ok(HttpResponse::Created().json(UploadResponse {
        message: "File uploaded successfully",
        url,
    }))
}
