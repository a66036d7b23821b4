//! Course and marketplace content service.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the entities,
//! validation rules and services; [`inbound::http`] adapts them to Actix
//! handlers; [`outbound`] implements the ports against MongoDB, Google
//! Cloud Storage and Google sign-in. [`admin`] is the client library used
//! by the administration tooling.

pub mod admin;
pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
