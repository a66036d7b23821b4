//! Server settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `COURSEWARE_*` environment variables over an
//! optional configuration file. Every field is optional; accessors apply
//! the defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::Zeroizing;

use crate::inbound::http::state::{DEFAULT_MAX_UPLOAD_BYTES, HttpStateOptions};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_NAME: &str = "courseware";
/// Bytes of entropy in a development signing secret.
const EPHEMERAL_SECRET_BYTES: usize = 32;

/// Startup failures caused by configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` did not parse as a socket address.
    #[error("invalid bind address '{value}': {message}")]
    BindAddr {
        /// Raw configured value.
        value: String,
        /// Parser message.
        message: String,
    },
    /// No signing secret was configured for a release build.
    #[error("COURSEWARE_JWT_SECRET must be set")]
    MissingJwtSecret,
}

/// Configuration values for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COURSEWARE")]
pub struct Settings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// MongoDB connection string; in-memory storage when absent.
    pub mongodb_uri: Option<String>,
    /// Database holding every collection.
    pub database_name: Option<String>,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// OAuth client id that Google ID tokens must be issued for.
    pub google_client_id: Option<String>,
    /// Bucket receiving uploads.
    pub storage_bucket: Option<String>,
    /// Service-account JSON key used to write to the bucket.
    pub storage_credentials_file: Option<PathBuf>,
    /// Whether a failed image upload aborts create requests.
    ///
    /// Environment and file only: a clap switch could never turn it off.
    #[ortho_config(default = true, skip_cli)]
    pub image_upload_required: bool,
    /// CORS origins, one value or comma-separated; any origin when empty.
    #[ortho_config(skip_cli)]
    pub allowed_origins: Option<OriginList>,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: Option<usize>,
}

/// `allowed_origins` as loaded: a single origin stays a string while a
/// comma-separated value arrives as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OriginList {
    /// One origin.
    One(String),
    /// Several origins.
    Many(Vec<String>),
}

impl OriginList {
    fn iter(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            Self::One(origin) => std::slice::from_ref(origin),
            Self::Many(origins) => origins,
        };
        items
            .iter()
            .flat_map(|item| item.split(','))
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl Settings {
    /// Socket address to bind, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Configured MongoDB URI, if any.
    #[must_use]
    pub fn mongodb_uri(&self) -> Option<&str> {
        non_blank(self.mongodb_uri.as_ref())
    }

    #[must_use]
    pub fn database_name(&self) -> &str {
        non_blank(self.database_name.as_ref()).unwrap_or(DEFAULT_DATABASE_NAME)
    }

    #[must_use]
    pub fn google_client_id(&self) -> Option<&str> {
        non_blank(self.google_client_id.as_ref())
    }

    #[must_use]
    pub fn storage_bucket(&self) -> Option<&str> {
        non_blank(self.storage_bucket.as_ref())
    }

    /// Parsed CORS origins.
    #[must_use]
    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .iter()
            .flat_map(OriginList::iter)
            .map(str::to_owned)
            .collect()
    }

    /// Handler options derived from these settings.
    #[must_use]
    pub fn http_options(&self) -> HttpStateOptions {
        HttpStateOptions {
            image_upload_required: self.image_upload_required,
            max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    /// Signing secret for bearer tokens.
    ///
    /// Debug builds without a configured secret get a random one, so tokens
    /// do not survive a restart. Release builds refuse to start.
    pub fn jwt_secret(&self) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        self.jwt_secret_for(cfg!(debug_assertions))
    }

    fn jwt_secret_for(&self, allow_ephemeral: bool) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        if let Some(secret) = non_blank(self.jwt_secret.as_ref()) {
            return Ok(Zeroizing::new(secret.as_bytes().to_vec()));
        }
        if !allow_ephemeral {
            return Err(SettingsError::MissingJwtSecret);
        }
        warn!("COURSEWARE_JWT_SECRET not set; using an ephemeral signing secret (dev only)");
        let mut bytes = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_BYTES]);
        rand::thread_rng().fill_bytes(&mut bytes);
        Ok(Zeroizing::new(hex::encode(bytes.as_slice()).into_bytes()))
    }
}
