//! Port for public media storage.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures raised by object store adapters.
    pub enum ObjectStoreError {
        /// The store could not be initialised; every call fails the same way.
        Unavailable { message: String } => "object storage unavailable: {message}",
        /// Writing the object failed.
        Write { message: String } => "object upload failed: {message}",
    }
}

/// Writes objects that are readable by anyone holding the returned URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` with public-read access and return its URL.
    async fn put_public(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ObjectStoreError>;
}
