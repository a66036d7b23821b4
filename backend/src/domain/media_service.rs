//! Uploads client media to the object store.

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, info};

use super::media::{MediaUpload, object_key};
use super::ports::{ObjectStore, ObjectStoreError};
use super::Error;

/// Builds keys for uploads and hands the bytes to an [`ObjectStore`].
#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
}

fn map_store_error(err: ObjectStoreError) -> Error {
    error!(error = %err, kind = err.kind(), "object store rejected upload");
    match err {
        ObjectStoreError::Unavailable { message } => Error::storage_unavailable(message),
        ObjectStoreError::Write { message } => Error::upload_failed(message),
    }
}

impl MediaService {
    /// Create a service over `store`.
    pub fn new(store: Arc<dyn ObjectStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Store `upload` under `folder` and return its public URL.
    ///
    /// Failures keep the store's cause in the message; HTTP adapters redact
    /// it before responding.
    pub async fn upload(&self, upload: MediaUpload, folder: Option<&str>) -> Result<String, Error> {
        if upload.bytes.is_empty() {
            return Err(Error::invalid_request("uploaded file is empty"));
        }
        let key = object_key(
            folder,
            upload.filename.as_deref(),
            self.clock.utc().timestamp_millis(),
        );
        let content_type = upload.content_type().to_owned();
        let size = upload.bytes.len();
        let url = self
            .store
            .put_public(&key, upload.bytes, &content_type)
            .await
            .map_err(map_store_error)?;
        info!(%key, size, "stored upload");
        Ok(url)
    }
}
