//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for tests and for the
//! `test-support` feature.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::Trace;
use crate::domain::ports::{IdentityProvider, IdentityProviderError, ObjectStore};
use crate::domain::{AuthSession, ExternalIdentity, Registration};
use crate::inbound::http::routes::configure_api;
use crate::inbound::http::state::{HttpState, HttpStateOptions, HttpStatePorts};
use crate::outbound::auth::{Argon2PasswordHasher, JwtTokenService};

pub use crate::outbound::persistence::{
    MemoryComponentRepository, MemoryCourseRepository, MemoryOrderRepository,
    MemoryProductRepository, MemoryProjectRepository, MemoryUserRepository,
};
pub use crate::outbound::storage::{MemoryObjectStore, UnavailableObjectStore};

/// Milliseconds since the epoch of [`fixture_instant`]: 2023-11-14T22:13:20Z.
pub const FIXTURE_MILLIS: i64 = 1_700_000_000_000;

/// Secret used to sign tokens in test states.
pub const TEST_JWT_SECRET: &[u8] = b"test-signing-secret";

/// The instant every fixture clock starts at.
#[must_use]
pub fn fixture_instant() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(FIXTURE_MILLIS)
        .single()
        .unwrap_or_default()
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    utc_now: DateTime<Utc>,
}

impl FixedClock {
    /// Clock reading `utc_now` forever.
    #[must_use]
    pub fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Shared clock fixed at [`fixture_instant`].
#[must_use]
pub fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::at(fixture_instant()))
}

/// Identity provider answering from a fixed token table.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityProvider {
    identities: HashMap<String, ExternalIdentity>,
}

impl StaticIdentityProvider {
    /// Accept `id_token` as asserting `identity`.
    #[must_use]
    pub fn with_identity(mut self, id_token: &str, identity: ExternalIdentity) -> Self {
        self.identities.insert(id_token.to_owned(), identity);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify_id_token(
        &self,
        id_token: &str,
    ) -> Result<ExternalIdentity, IdentityProviderError> {
        self.identities
            .get(id_token)
            .cloned()
            .ok_or_else(|| IdentityProviderError::invalid_token("unknown test token"))
    }
}

/// In-memory adapters behind an [`HttpState`], kept so tests can inspect
/// what handlers stored.
#[derive(Clone)]
pub struct TestHarness {
    pub users: Arc<MemoryUserRepository>,
    pub courses: Arc<MemoryCourseRepository>,
    pub components: Arc<MemoryComponentRepository>,
    pub products: Arc<MemoryProductRepository>,
    pub projects: Arc<MemoryProjectRepository>,
    pub orders: Arc<MemoryOrderRepository>,
    pub objects: Arc<MemoryObjectStore>,
    pub state: HttpState,
}

impl TestHarness {
    /// Harness with default options and no Google identities.
    #[must_use]
    pub fn new() -> Self {
        Self::with(HttpStateOptions::default(), StaticIdentityProvider::default())
    }

    /// Harness with explicit options and identity table.
    #[must_use]
    pub fn with(options: HttpStateOptions, identity: StaticIdentityProvider) -> Self {
        Self::build(options, identity, None)
    }

    /// Harness whose uploads go to `store` instead of [`Self::objects`].
    #[must_use]
    pub fn with_store(options: HttpStateOptions, store: Arc<dyn ObjectStore>) -> Self {
        Self::build(options, StaticIdentityProvider::default(), Some(store))
    }

    fn build(
        options: HttpStateOptions,
        identity: StaticIdentityProvider,
        store: Option<Arc<dyn ObjectStore>>,
    ) -> Self {
        let users = Arc::new(MemoryUserRepository::default());
        let courses = Arc::new(MemoryCourseRepository::default());
        let components = Arc::new(MemoryComponentRepository::default());
        let products = Arc::new(MemoryProductRepository::default());
        let projects = Arc::new(MemoryProjectRepository::default());
        let orders = Arc::new(MemoryOrderRepository::default());
        let objects = Arc::new(MemoryObjectStore::default());
        let clock = fixture_clock();
        let state = HttpState::new(
            HttpStatePorts {
                users: users.clone(),
                hasher: Arc::new(Argon2PasswordHasher),
                tokens: Arc::new(JwtTokenService::new(TEST_JWT_SECRET, clock.clone())),
                identity: Arc::new(identity),
                courses: courses.clone(),
                components: components.clone(),
                products: products.clone(),
                projects: projects.clone(),
                orders: orders.clone(),
                objects: store.unwrap_or_else(|| objects.clone() as Arc<dyn ObjectStore>),
                clock,
            },
            options,
        );
        Self {
            users,
            courses,
            components,
            products,
            projects,
            orders,
            objects,
            state,
        }
    }
}

/// Password used by [`TestHarness::sign_up`].
pub const TEST_PASSWORD: &str = "correct-horse";

impl TestHarness {
    /// Register `username` through the auth service and return its session.
    ///
    /// # Panics
    /// Panics when registration fails, which means the fixture is broken.
    pub async fn sign_up(&self, username: &str) -> AuthSession {
        let email = format!("{username}@example.com");
        let registration =
            Registration::try_from_parts(Some(username), Some(&email), Some(TEST_PASSWORD))
                .expect("fixture registration is valid");
        self.state
            .auth
            .register(registration)
            .await
            .expect("fixture registration succeeds")
    }

    /// `Authorization` header value for a freshly registered user.
    pub async fn bearer(&self, username: &str) -> String {
        format!("Bearer {}", self.sign_up(username).await.token)
    }

    /// Application serving the `/api` routes over this harness's state.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(Trace)
            .configure(configure_api)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.
    //!
    //! Resolves `RefOr<Schema>` wrappers to concrete `Object` schemas with
    //! diagnostic messages on type mismatches.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic if not an Object.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => {
                panic!(
                    "schema '{name}' is a $ref to '{}'; resolve the reference first",
                    reference.ref_location
                );
            }
            RefOr::T(Schema::Array(_)) => {
                panic!("schema '{name}' is an Array, not an Object");
            }
            _ => panic!("schema '{name}' has unexpected type"),
        }
    }

    /// Get a property from an Object schema by name.
    pub fn get_property<'a>(obj: &'a Object, field: &str) -> &'a RefOr<Schema> {
        match obj.properties.get(field) {
            Some(property) => property,
            None => panic!("property '{field}' not found"),
        }
    }
}

pub mod multipart {
    //! Hand-built `multipart/form-data` bodies for handler tests.

    /// Boundary used by [`body`].
    pub const BOUNDARY: &str = "courseware-test-boundary";

    /// One form part: a text field or a file.
    pub enum Part<'a> {
        /// Plain text field.
        Text(&'a str, &'a str),
        /// File field with filename, content type and bytes.
        File(&'a str, &'a str, &'a str, &'a [u8]),
    }

    /// `Content-Type` header value matching [`body`].
    #[must_use]
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    /// Encode `parts` as a multipart body.
    #[must_use]
    pub fn body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut out = Vec::new();
        for part in parts {
            out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    out.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    out.extend_from_slice(value.as_bytes());
                }
                Part::File(name, filename, content_type, bytes) => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(bytes);
                }
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        out
    }
}
