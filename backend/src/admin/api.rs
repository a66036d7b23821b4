//! HTTP client for the courseware API.
//!
//! [`AdminApi`] is the seam the rest of the admin client talks to;
//! [`HttpAdminApi`] implements it over `reqwest`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::{
    AuthSession, Component, ComponentCategory, Course, Product, PublicUser, ResourceKind,
};

use super::draft::CoursePayload;
use super::drop_zone::DroppedFile;

/// Failures surfaced by the admin client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    /// The server rejected the token or credentials.
    #[error("{0}")]
    Unauthorized(String),
    /// The server answered with another error status.
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),
    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
    /// The local session cache could not be read or written.
    #[error("session storage failed: {0}")]
    Storage(String),
    /// The draft failed client-side validation.
    #[error("{0}")]
    Invalid(String),
}

/// Email and password sent to `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Fields for `POST /api/components/create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentPayload {
    pub name: String,
    pub category: ComponentCategory,
    pub description: String,
    pub image: Option<DroppedFile>,
}

/// Fields for `POST /api/products/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub price: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body of `PATCH /api/updateVisibility`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityUpdate {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_on_home: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_on_catalog: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

/// Operations the admin tooling performs against the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, AdminError>;

    /// Resolve the account behind `token`.
    async fn me(&self, token: &str) -> Result<PublicUser, AdminError>;

    /// Store a file and return its public URL.
    async fn upload(
        &self,
        token: &str,
        file: &DroppedFile,
        folder: Option<&'static str>,
    ) -> Result<String, AdminError>;

    async fn publish_course(&self, token: &str, payload: &CoursePayload)
    -> Result<Course, AdminError>;

    async fn create_component(
        &self,
        token: &str,
        payload: &ComponentPayload,
    ) -> Result<Component, AdminError>;

    async fn create_product(
        &self,
        token: &str,
        payload: &ProductPayload,
    ) -> Result<Product, AdminError>;

    /// Returns the updated record as sent by the server.
    async fn update_visibility(
        &self,
        token: &str,
        update: &VisibilityUpdate,
    ) -> Result<Value, AdminError>;
}

/// [`AdminApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAdminApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAdminApi {
    /// Client for the server at `base_url`, e.g. `https://api.example.com`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, AdminError> {
        let response = request
            .send()
            .await
            .map_err(|err| AdminError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| AdminError::Transport(err.to_string()))?;
        debug!(status = status.as_u16(), "admin api response");
        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|err| AdminError::Decode(err.to_string()));
        }
        let message = serde_json::from_slice::<ErrorReply>(&body)
            .map(|reply| reply.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Request failed").to_owned());
        Err(match status {
            StatusCode::UNAUTHORIZED => AdminError::Unauthorized(message),
            other => AdminError::Rejected {
                status: other.as_u16(),
                message,
            },
        })
    }
}

fn file_part(file: &DroppedFile) -> Result<Part, AdminError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.content_type)
        .map_err(|err| AdminError::Invalid(format!("invalid content type: {err}")))
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, AdminError> {
        Self::send(self.http.post(self.url("/api/auth/login")).json(request)).await
    }

    async fn me(&self, token: &str) -> Result<PublicUser, AdminError> {
        Self::send(self.http.get(self.url("/api/auth/me")).bearer_auth(token)).await
    }

    async fn upload(
        &self,
        token: &str,
        file: &DroppedFile,
        folder: Option<&'static str>,
    ) -> Result<String, AdminError> {
        let mut form = Form::new().part("file", file_part(file)?);
        if let Some(folder) = folder {
            form = form.text("folder", folder);
        }
        let reply: UploadReply = Self::send(
            self.http
                .post(self.url("/api/upload"))
                .bearer_auth(token)
                .multipart(form),
        )
        .await?;
        Ok(reply.url)
    }

    async fn publish_course(
        &self,
        token: &str,
        payload: &CoursePayload,
    ) -> Result<Course, AdminError> {
        Self::send(
            self.http
                .post(self.url("/api/courses/create"))
                .bearer_auth(token)
                .json(payload),
        )
        .await
    }

    async fn create_component(
        &self,
        token: &str,
        payload: &ComponentPayload,
    ) -> Result<Component, AdminError> {
        let mut form = Form::new()
            .text("name", payload.name.clone())
            .text("category", payload.category.as_str())
            .text("description", payload.description.clone());
        if let Some(image) = &payload.image {
            form = form.part("image", file_part(image)?);
        }
        Self::send(
            self.http
                .post(self.url("/api/components/create"))
                .bearer_auth(token)
                .multipart(form),
        )
        .await
    }

    async fn create_product(
        &self,
        token: &str,
        payload: &ProductPayload,
    ) -> Result<Product, AdminError> {
        Self::send(
            self.http
                .post(self.url("/api/products/create"))
                .bearer_auth(token)
                .json(payload),
        )
        .await
    }

    async fn update_visibility(
        &self,
        token: &str,
        update: &VisibilityUpdate,
    ) -> Result<Value, AdminError> {
        Self::send(
            self.http
                .patch(self.url("/api/updateVisibility"))
                .bearer_auth(token)
                .json(update),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("http://localhost:8080/", "http://localhost:8080/api/auth/me")]
    #[case("http://localhost:8080", "http://localhost:8080/api/auth/me")]
    fn base_url_is_normalised(#[case] base: &str, #[case] expected: &str) {
        let api = HttpAdminApi::new(reqwest::Client::new(), base);
        assert_eq!(api.url("/api/auth/me"), expected);
    }

    #[rstest]
    fn visibility_update_uses_the_wire_vocabulary() {
        let update = VisibilityUpdate {
            id: "intro-to-rust".to_owned(),
            kind: ResourceKind::Courses,
            visible_on_home: Some(true),
            visible_on_catalog: None,
        };
        assert_eq!(
            serde_json::to_value(&update).expect("serialise"),
            json!({"id": "intro-to-rust", "type": "courses", "visibleOnHome": true})
        );
    }
}
