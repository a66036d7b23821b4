//! In-process object store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{ObjectStore, ObjectStoreError};

/// Base URL for objects held by [`MemoryObjectStore`].
pub const MEMORY_STORE_BASE_URL: &str = "https://storage.test";

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// Object store that keeps uploads in memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    /// Keys written so far, in lexical order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Stored bytes and content type for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        let objects = self.objects.lock().ok()?;
        objects
            .get(key)
            .map(|object| (object.bytes.clone(), object.content_type.clone()))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_public(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| ObjectStoreError::write("in-memory object store lock poisoned"))?;
        objects.insert(
            key.to_owned(),
            StoredObject {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
        Ok(format!("{MEMORY_STORE_BASE_URL}/{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn stored_objects_are_addressable_by_key() {
        let store = MemoryObjectStore::default();
        let url = store
            .put_public("course_images/1-cover.png", vec![7, 8], "image/png")
            .await
            .expect("stored");
        assert_eq!(url, "https://storage.test/course_images/1-cover.png");
        assert_eq!(store.keys(), vec!["course_images/1-cover.png".to_owned()]);
        assert_eq!(
            store.get("course_images/1-cover.png"),
            Some((vec![7, 8], "image/png".to_owned()))
        );
    }
}
