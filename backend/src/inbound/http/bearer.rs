//! Bearer token extraction.
//!
//! Keeps handlers free of header parsing: a handler that takes
//! [`BearerAuth`] only runs for requests carrying a valid token.

use std::future::{Ready, ready};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};

use crate::domain::{AuthClaims, Error};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Claims of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerAuth(pub AuthClaims);

impl BearerAuth {
    /// The verified claims.
    #[must_use]
    pub fn claims(&self) -> &AuthClaims {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<BearerAuth, Error> {
    let token = bearer_token(req).ok_or_else(|| Error::unauthorized("Access token required"))?;
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    state.auth.verify(token).map(BearerAuth)
}

impl FromRequest for BearerAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
