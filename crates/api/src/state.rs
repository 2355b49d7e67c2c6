//! Application state shared across handlers.

use std::sync::Arc;

use crate::blob::BlobStore;
use crate::store::KeyValueStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Handlers construct the services they need
/// per request from the store handles in here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Box<dyn KeyValueStore>,
    blobs: Box<dyn BlobStore>,
}

impl AppState {
    /// Create a new application state over the given backends.
    pub fn new(store: impl KeyValueStore + 'static, blobs: impl BlobStore + 'static) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Box::new(store),
                blobs: Box::new(blobs),
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn blobs(&self) -> &dyn BlobStore {
        self.inner.blobs.as_ref()
    }
}
