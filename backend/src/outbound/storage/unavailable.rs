//! Object store that fails every call with the reason captured at startup.

use async_trait::async_trait;

use crate::domain::ports::{ObjectStore, ObjectStoreError};

/// Stand-in used when storage could not be initialised.
///
/// Requests that need no upload keep working; requests that do fail fast
/// with the recorded reason instead of retrying initialisation.
#[derive(Debug, Clone)]
pub struct UnavailableObjectStore {
    reason: String,
}

impl UnavailableObjectStore {
    /// Record why storage is unavailable.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The recorded reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl ObjectStore for UnavailableObjectStore {
    async fn put_public(
        &self,
        _key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        Err(ObjectStoreError::unavailable(self.reason.clone()))
    }
}
