//! Builders turning settings into adapters and adapters into HTTP state.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use mockable::{Clock, DefaultClock};
use tracing::{error, info, warn};

use courseware::config::Settings;
use courseware::domain::ports::{IdentityProvider, ObjectStore};
use courseware::inbound::http::health::HealthState;
use courseware::inbound::http::state::{HttpState, HttpStatePorts};
use courseware::outbound::auth::{
    Argon2PasswordHasher, GoogleIdentityProvider, JwtTokenService, UnconfiguredIdentityProvider,
};
use courseware::outbound::persistence::{
    MemoryComponentRepository, MemoryCourseRepository, MemoryOrderRepository,
    MemoryProductRepository, MemoryProjectRepository, MemoryUserRepository,
    MongoComponentRepository, MongoCourseRepository, MongoOrderRepository,
    MongoProductRepository, MongoProjectRepository, MongoStore, MongoUserRepository,
};
use courseware::outbound::storage::{GcsObjectStore, ServiceAccountKey, UnavailableObjectStore};

use super::ServerConfig;

/// Connect to MongoDB when a URI is configured.
///
/// A configured but unreachable database is fatal; no URI means in-memory
/// repositories, which lose everything on restart.
async fn connect_mongo(
    settings: &Settings,
    health: &HealthState,
) -> color_eyre::Result<Option<MongoStore>> {
    let Some(uri) = settings.mongodb_uri() else {
        warn!("COURSEWARE_MONGODB_URI not set; using in-memory repositories");
        health.note_degraded("in-memory persistence");
        return Ok(None);
    };
    let store = MongoStore::connect(uri, settings.database_name())
        .await
        .wrap_err("failed to connect to MongoDB")?;
    Ok(Some(store))
}

/// Object store for uploads. Missing or broken credentials do not stop the
/// server; uploads fail with the recorded reason instead.
async fn build_object_store(
    settings: &Settings,
    http: &reqwest::Client,
    health: &HealthState,
) -> Arc<dyn ObjectStore> {
    let (Some(bucket), Some(path)) = (
        settings.storage_bucket(),
        settings.storage_credentials_file.as_deref(),
    ) else {
        warn!("object storage not configured; uploads will fail");
        health.note_degraded("storage not configured");
        return Arc::new(UnavailableObjectStore::new("storage not configured"));
    };

    let store = match ServiceAccountKey::from_file(path).await {
        Ok(key) => GcsObjectStore::new(http.clone(), bucket, key),
        Err(err) => Err(err),
    };
    match store {
        Ok(store) => {
            info!(bucket, "object storage ready");
            Arc::new(store)
        }
        Err(err) => {
            error!(error = %err, path = %path.display(), "object storage initialisation failed");
            health.note_degraded("storage unavailable");
            Arc::new(UnavailableObjectStore::new(err.to_string()))
        }
    }
}

fn build_identity_provider(
    settings: &Settings,
    http: &reqwest::Client,
    health: &HealthState,
) -> Arc<dyn IdentityProvider> {
    match settings.google_client_id() {
        Some(client_id) => Arc::new(GoogleIdentityProvider::new(http.clone(), client_id)),
        None => {
            warn!("COURSEWARE_GOOGLE_CLIENT_ID not set; Google sign-in disabled");
            health.note_degraded("google sign-in disabled");
            Arc::new(UnconfiguredIdentityProvider)
        }
    }
}

/// Resolve every adapter named by `settings`.
pub async fn server_config(
    settings: &Settings,
    health: &HealthState,
) -> color_eyre::Result<ServerConfig> {
    let http = reqwest::Client::builder()
        .build()
        .wrap_err("failed to build HTTP client")?;
    let config = ServerConfig::new(settings.bind_addr()?, settings.jwt_secret()?)
        .with_object_store(build_object_store(settings, &http, health).await)
        .with_identity_provider(build_identity_provider(settings, &http, health))
        .with_allowed_origins(settings.allowed_origins())
        .with_options(settings.http_options());
    Ok(match connect_mongo(settings, health).await? {
        Some(store) => config.with_mongo(store),
        None => config,
    })
}

/// Wire the domain services over the configured adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(JwtTokenService::new(&config.jwt_secret, clock.clone()));
    let ports = match &config.mongo {
        Some(store) => HttpStatePorts {
            users: Arc::new(MongoUserRepository::new(store)),
            hasher: Arc::new(Argon2PasswordHasher),
            tokens,
            identity: config.identity.clone(),
            courses: Arc::new(MongoCourseRepository::new(store)),
            components: Arc::new(MongoComponentRepository::new(store)),
            products: Arc::new(MongoProductRepository::new(store)),
            projects: Arc::new(MongoProjectRepository::new(store)),
            orders: Arc::new(MongoOrderRepository::new(store)),
            objects: config.objects.clone(),
            clock,
        },
        None => HttpStatePorts {
            users: Arc::new(MemoryUserRepository::default()),
            hasher: Arc::new(Argon2PasswordHasher),
            tokens,
            identity: config.identity.clone(),
            courses: Arc::new(MemoryCourseRepository::default()),
            components: Arc::new(MemoryComponentRepository::default()),
            products: Arc::new(MemoryProductRepository::default()),
            projects: Arc::new(MemoryProjectRepository::default()),
            orders: Arc::new(MemoryOrderRepository::default()),
            objects: config.objects.clone(),
            clock,
        },
    };
    web::Data::new(HttpState::new(ports, config.options))
}
