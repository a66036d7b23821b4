//! HTTP inbound adapter exposing the REST endpoints under `/api`.
//!
//! Handlers translate requests into domain calls on [`state::HttpState`]
//! and let [`crate::domain::Error`] render failures through
//! [`actix_web::ResponseError`].

pub mod auth;
pub mod bearer;
pub mod catalogue;
pub mod cors;
pub mod courses;
pub mod error;
pub mod form;
pub mod health;
pub mod orders;
pub mod routes;
pub mod schemas;
pub mod state;
pub mod upload;
pub mod visibility;

pub use error::ApiResult;
