//! Blob store for product images.
//!
//! The [`BlobStore`] trait mirrors an object-store contract (put/delete by
//! key). [`FsBlobStore`] writes under the configured media root, which the
//! server also serves read-only at `/media`. [`MemoryBlobStore`] backs tests.
//!
//! Deletes are best-effort at every call site: a failed image cleanup is
//! logged and swallowed, never surfaced to the caller.

pub mod fs;
pub mod memory;

use async_trait::async_trait;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

/// Errors that can occur during blob operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// Filesystem I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The key is empty, absolute, or escapes the store root.
    #[error("invalid blob key: {0}")]
    InvalidKey(String),

    /// Injected failure (test backends only).
    #[error("blob store unavailable")]
    Unavailable,
}

/// Object-store contract for opaque binary blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob under `key`, replacing any existing content.
    async fn put(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<(), BlobError>;

    /// Delete the blob at `key`. Deleting a missing blob is a no-op.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}
