//! In-memory blob store for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BlobError, BlobStore};

/// In-memory blob store.
///
/// Can be told to fail deletes, which tests use to verify that image cleanup
/// is best-effort and never surfaces to the caller.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, (String, Vec<u8>)>>,
    fail_on_delete: RwLock<bool>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_delete(&self, fail: bool) {
        *self.fail_on_delete.write().await = fail;
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.blobs.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<(), BlobError> {
        self.blobs
            .write()
            .await
            .insert(key.to_owned(), (content_type.to_owned(), bytes.to_vec()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        if *self.fail_on_delete.read().await {
            return Err(BlobError::Unavailable);
        }
        self.blobs.write().await.remove(key);
        Ok(())
    }
}
