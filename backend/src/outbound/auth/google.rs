//! Google ID token verification against the published JWKS.
//!
//! Signing keys are fetched over HTTPS and cached for [`JWKS_CACHE_TTL`].
//! A token naming an unknown `kid` forces a refresh so key rotation is
//! picked up without waiting for the cache to lapse, but at most once per
//! [`JWKS_MIN_REFRESH_INTERVAL`]. Cache hits never wait on a refresh.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Email, ExternalIdentity};

/// Google's public signing keys.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);
/// Shortest gap between two key fetches, whatever the tokens ask for.
const JWKS_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Google-issued ID tokens for one OAuth client.
pub struct GoogleIdentityProvider {
    http: reqwest::Client,
    client_id: String,
    jwks_url: String,
    keys: RwLock<Option<CachedKeys>>,
    /// Held while refreshing; records when the last fetch was attempted.
    last_refresh: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for GoogleIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleIdentityProvider")
            .field("client_id", &self.client_id)
            .field("jwks_url", &self.jwks_url)
            .finish_non_exhaustive()
    }
}

impl GoogleIdentityProvider {
    /// Provider accepting tokens whose audience is `client_id`.
    pub fn new(http: reqwest::Client, client_id: impl Into<String>) -> Self {
        Self {
            http,
            client_id: client_id.into(),
            jwks_url: GOOGLE_JWKS_URL.to_owned(),
            keys: RwLock::new(None),
            last_refresh: Mutex::new(None),
        }
    }

    /// Seed the key cache, skipping the first fetch.
    #[must_use]
    pub fn with_keys(self, keys: JwkSet) -> Self {
        let now = Instant::now();
        Self {
            keys: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: now,
            })),
            last_refresh: Mutex::new(Some(now)),
            ..self
        }
    }

    /// Fetch keys from `url` instead of Google's endpoint.
    #[must_use]
    pub fn with_jwks_url(self, url: impl Into<String>) -> Self {
        Self {
            jwks_url: url.into(),
            ..self
        }
    }

    async fn fetch_keys(&self) -> Result<JwkSet, IdentityProviderError> {
        debug!(url = %self.jwks_url, "fetching identity provider keys");
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| IdentityProviderError::unavailable(err.to_string()))?;
        response
            .json::<JwkSet>()
            .await
            .map_err(|err| IdentityProviderError::unavailable(err.to_string()))
    }

    async fn cached_key(&self, kid: &str) -> Result<Option<DecodingKey>, IdentityProviderError> {
        let cache = self.keys.read().await;
        cache
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < JWKS_CACHE_TTL)
            .and_then(|cached| cached.keys.find(kid))
            .map(DecodingKey::from_jwk)
            .transpose()
            .map_err(|err| IdentityProviderError::invalid_token(err.to_string()))
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, IdentityProviderError> {
        if let Some(key) = self.cached_key(kid).await? {
            return Ok(key);
        }

        let mut last_refresh = self.last_refresh.lock().await;
        // Another sign-in may have refreshed the keys while this one waited.
        if let Some(key) = self.cached_key(kid).await? {
            return Ok(key);
        }
        if last_refresh.is_some_and(|at| at.elapsed() < JWKS_MIN_REFRESH_INTERVAL) {
            let has_keys = self.keys.read().await.is_some();
            debug!(%kid, "skipping key refresh inside the minimum interval");
            return Err(if has_keys {
                IdentityProviderError::invalid_token(format!("unknown key id {kid}"))
            } else {
                IdentityProviderError::unavailable("signing keys could not be fetched recently")
            });
        }

        *last_refresh = Some(Instant::now());
        let keys = self.fetch_keys().await?;
        let key = keys
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()
            .map_err(|err| IdentityProviderError::invalid_token(err.to_string()))?;
        *self.keys.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        key.ok_or_else(|| IdentityProviderError::invalid_token(format!("unknown key id {kid}")))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify_id_token(
        &self,
        id_token: &str,
    ) -> Result<ExternalIdentity, IdentityProviderError> {
        let header = decode_header(id_token)
            .map_err(|err| IdentityProviderError::invalid_token(err.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| IdentityProviderError::invalid_token("token has no key id"))?;
        let key = self.decoding_key(&kid).await?;
        let claims = decode::<GoogleClaims>(id_token, &key, &self.validation())
            .map_err(|err| IdentityProviderError::invalid_token(err.to_string()))?
            .claims;

        if claims.email_verified == Some(false) {
            warn!("rejected identity token with unverified email");
            return Err(IdentityProviderError::invalid_token("email is not verified"));
        }
        let raw_email = claims
            .email
            .ok_or_else(|| IdentityProviderError::invalid_token("token carries no email"))?;
        let email = Email::new(&raw_email)
            .map_err(|err| IdentityProviderError::invalid_token(err.to_string()))?;
        Ok(ExternalIdentity {
            email,
            name: claims.name.filter(|name| !name.trim().is_empty()),
            picture: claims.picture,
        })
    }
}

/// Provider used when no Google client id is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredIdentityProvider;

#[async_trait]
impl IdentityProvider for UnconfiguredIdentityProvider {
    async fn verify_id_token(
        &self,
        _id_token: &str,
    ) -> Result<ExternalIdentity, IdentityProviderError> {
        Err(IdentityProviderError::not_configured())
    }
}
