//! Account handlers.
//!
//! ```text
//! POST /api/auth/register   {"username","email","password"}
//! POST /api/auth/login      {"email","password"}
//! POST /api/auth/googleSign {"tokenId"}
//! GET  /api/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthSession, Error, LoginCredentials, PublicUser, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::BearerAuth;
use crate::inbound::http::schemas::{AuthSessionSchema, ErrorSchema, PublicUserSchema};
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/auth/register`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /api/auth/googleSign`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignRequest {
    #[serde(alias = "idToken")]
    pub token_id: Option<String>,
}

/// Create a student account and return a signed-in session.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthSessionSchema),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 409, description = "Username or email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let registration = Registration::try_from_parts(
        body.username.as_deref(),
        body.email.as_deref(),
        body.password.as_deref(),
    )?;
    let session = state.auth.register(registration).await?;
    Ok(HttpResponse::Created().json(session))
}

/// Exchange email and password for a token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthSessionSchema),
        (status = 400, description = "Missing field", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthSession>> {
    let body = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(body.email.as_deref(), body.password.as_deref())?;
    state.auth.login(credentials).await.map(web::Json)
}

/// Sign in with a Google ID token, creating the account on first use.
#[utoipa::path(
    post,
    path = "/api/auth/googleSign",
    request_body = GoogleSignRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthSessionSchema),
        (status = 400, description = "Missing token", body = ErrorSchema),
        (status = 500, description = "Token rejected or sign-in unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "googleSign",
    security([])
)]
#[post("/googleSign")]
pub async fn google_sign(
    state: web::Data<HttpState>,
    payload: web::Json<GoogleSignRequest>,
) -> ApiResult<web::Json<AuthSession>> {
    let token = payload
        .into_inner()
        .token_id
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| {
            Error::invalid_request("tokenId is required")
                .with_details(serde_json::json!({ "field": "tokenId" }))
        })?;
    state.auth.google_login(&token).await.map(web::Json)
}

/// The account behind the bearer token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = PublicUserSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<web::Json<PublicUser>> {
    state.auth.current_user(auth.claims()).await.map(web::Json)
}
