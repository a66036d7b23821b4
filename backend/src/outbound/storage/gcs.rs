//! Google Cloud Storage adapter.
//!
//! Authenticates with a service-account key: a signed RS256 assertion is
//! exchanged for an OAuth access token (JWT bearer grant), which is cached
//! until shortly before it expires. Objects are written with the simple
//! media upload API and the `publicRead` predefined ACL.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error};
use url::Url;
use zeroize::Zeroizing;

use crate::domain::ports::{ObjectStore, ObjectStoreError};

const UPLOAD_ENDPOINT: &str = "https://storage.googleapis.com/upload/storage/v1/b";
const PUBLIC_BASE_URL: &str = "https://storage.googleapis.com";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh the access token this long before the provider says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Fields read from a service-account JSON key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    client_email: String,
    private_key: Zeroizing<String>,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse a key from JSON text.
    pub fn from_json(raw: &str) -> Result<Self, ObjectStoreError> {
        serde_json::from_str(raw)
            .map_err(|err| ObjectStoreError::unavailable(format!("invalid credentials: {err}")))
    }

    /// Read and parse a key file.
    pub async fn from_file(path: &Path) -> Result<Self, ObjectStoreError> {
        let raw = Zeroizing::new(tokio::fs::read_to_string(path).await.map_err(|err| {
            ObjectStoreError::unavailable(format!(
                "cannot read credentials file {}: {err}",
                path.display()
            ))
        })?);
        Self::from_json(&raw)
    }

    /// Service account identity.
    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: Zeroizing<String>,
    refresh_at: Instant,
}

/// Public object URL for `key` in `bucket`.
///
/// Each `/`-separated part of the key is percent-encoded as a path segment,
/// so names holding `#`, `?` or `%` still address the stored object.
pub fn public_url(bucket: &str, key: &str) -> Result<String, ObjectStoreError> {
    let mut url = Url::parse(PUBLIC_BASE_URL)
        .map_err(|err| ObjectStoreError::write(format!("invalid public base url: {err}")))?;
    url.path_segments_mut()
        .map_err(|()| ObjectStoreError::write("public base url cannot hold a path"))?
        .pop_if_empty()
        .push(bucket)
        .extend(key.split('/'));
    Ok(url.into())
}

/// Writes public objects to one Cloud Storage bucket.
pub struct GcsObjectStore {
    http: reqwest::Client,
    bucket: String,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for GcsObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsObjectStore")
            .field("bucket", &self.bucket)
            .field("client_email", &self.key.client_email)
            .finish_non_exhaustive()
    }
}

impl GcsObjectStore {
    /// Build a store for `bucket` authenticating as `key`.
    ///
    /// Fails when the private key is not a valid RSA PEM.
    pub fn new(
        http: reqwest::Client,
        bucket: impl Into<String>,
        key: ServiceAccountKey,
    ) -> Result<Self, ObjectStoreError> {
        let bucket = bucket.into();
        if bucket.trim().is_empty() {
            return Err(ObjectStoreError::unavailable("storage bucket is empty"));
        }
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|err| {
            ObjectStoreError::unavailable(format!("invalid service account private key: {err}"))
        })?;
        Ok(Self {
            http,
            bucket,
            key,
            signing_key,
            token: Mutex::new(None),
        })
    }

    /// Bucket receiving uploads.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn access_token(&self) -> Result<Zeroizing<String>, ObjectStoreError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }
        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken, ObjectStoreError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: STORAGE_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|err| ObjectStoreError::write(format!("failed to sign assertion: {err}")))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|err| ObjectStoreError::write(format!("token exchange failed: {err}")))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ObjectStoreError::write(format!(
                "token exchange returned {status}: {body}"
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| ObjectStoreError::write(format!("malformed token response: {err}")))?;
        debug!(expires_in = token.expires_in, "obtained storage access token");
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        Ok(CachedToken {
            value: Zeroizing::new(token.access_token),
            refresh_at: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn put_public(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        let token = self.access_token().await?;
        let url = format!("{UPLOAD_ENDPOINT}/{}/o", self.bucket);
        let response = self
            .http
            .post(url)
            .query(&[
                ("uploadType", "media"),
                ("name", key),
                ("predefinedAcl", "publicRead"),
            ])
            .bearer_auth(token.as_str())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|err| ObjectStoreError::write(format!("upload request failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, key, bucket = %self.bucket, "object upload rejected");
            return Err(ObjectStoreError::write(format!(
                "storage returned {status}: {body}"
            )));
        }
        public_url(&self.bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    #[case(
        "course_images/1700000000000-cover.png",
        "https://storage.googleapis.com/media-bucket/course_images/1700000000000-cover.png"
    )]
    #[case(
        "course_images/1-lesson_#1?.png",
        "https://storage.googleapis.com/media-bucket/course_images/1-lesson_%231%3F.png"
    )]
    #[case(
        "uploads/1-100%_done.txt",
        "https://storage.googleapis.com/media-bucket/uploads/1-100%25_done.txt"
    )]
    fn public_urls_encode_each_key_segment(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(public_url("media-bucket", key).expect("url"), expected);
    }

    #[rstest]
    fn sanitised_names_with_url_delimiters_stay_addressable() {
        let key = crate::domain::object_key(Some("course_images"), Some("lesson #1?.png"), 1);
        let url = public_url("bucket", &key).expect("url");
        let parsed = Url::parse(&url).expect("valid url");

        assert!(parsed.query().is_none());
        assert!(parsed.fragment().is_none());
        let last = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .expect("object segment");
        assert_eq!(last, "1-lesson_%231%3F.png");
    }

    #[rstest]
    fn key_json_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@example.iam.gserviceaccount.com","private_key":"pem"}"#,
        )
        .expect("parsed");
        assert_eq!(key.client_email(), "svc@example.iam.gserviceaccount.com");
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[rstest]
    fn debug_output_hides_private_key() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@example.test","private_key":"top-secret"}"#,
        )
        .expect("parsed");
        assert!(!format!("{key:?}").contains("top-secret"));
    }

    #[rstest]
    fn malformed_key_json_is_unavailable() {
        let err = ServiceAccountKey::from_json("{").expect_err("malformed");
        assert!(matches!(err, ObjectStoreError::Unavailable { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_key_file_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ServiceAccountKey::from_file(&dir.path().join("absent.json"))
            .await
            .expect_err("missing");
        assert!(err.to_string().contains("cannot read credentials file"));
    }

    #[rstest]
    #[tokio::test]
    async fn key_file_is_read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"client_email":"svc@example.test","private_key":"pem","token_uri":"https://token.test"}}"#
        )
        .expect("write");
        let key = ServiceAccountKey::from_file(file.path()).await.expect("read");
        assert_eq!(key.token_uri, "https://token.test");
    }

    #[rstest]
    fn non_pem_private_key_is_rejected() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@example.test","private_key":"not a pem"}"#,
        )
        .expect("parsed");
        let err = GcsObjectStore::new(reqwest::Client::new(), "bucket", key).expect_err("bad pem");
        assert!(err.to_string().contains("invalid service account private key"));
    }
}
