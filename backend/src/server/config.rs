//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use courseware::domain::ports::{IdentityProvider, ObjectStore};
use courseware::inbound::http::state::HttpStateOptions;
use courseware::outbound::auth::UnconfiguredIdentityProvider;
use courseware::outbound::persistence::MongoStore;
use courseware::outbound::storage::UnavailableObjectStore;
use zeroize::Zeroizing;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) mongo: Option<MongoStore>,
    pub(crate) objects: Arc<dyn ObjectStore>,
    pub(crate) identity: Arc<dyn IdentityProvider>,
    pub(crate) allowed_origins: Vec<String>,
    pub(crate) options: HttpStateOptions,
}

impl ServerConfig {
    /// Configuration with in-memory persistence, no object storage and no
    /// Google sign-in.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt_secret: Zeroizing<Vec<u8>>) -> Self {
        Self {
            bind_addr,
            jwt_secret,
            mongo: None,
            objects: Arc::new(UnavailableObjectStore::new("storage not configured")),
            identity: Arc::new(UnconfiguredIdentityProvider),
            allowed_origins: Vec::new(),
            options: HttpStateOptions::default(),
        }
    }

    /// Persist through MongoDB instead of process memory.
    #[must_use]
    pub fn with_mongo(mut self, store: MongoStore) -> Self {
        self.mongo = Some(store);
        self
    }

    /// Object store receiving uploads.
    #[must_use]
    pub fn with_object_store(mut self, objects: Arc<dyn ObjectStore>) -> Self {
        self.objects = objects;
        self
    }

    /// Verifier for Google ID tokens.
    #[must_use]
    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    /// Origins allowed by CORS; empty accepts any origin.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Handler behaviour switches.
    #[must_use]
    pub fn with_options(mut self, options: HttpStateOptions) -> Self {
        self.options = options;
        self
    }

    /// Socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
