//! Read-Through Loader
//!
//! Serves resources from the cache and fills misses from a provider.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::ResourceProvider;
use crate::cache::CacheStore;
use crate::error::{CacheError, Result};

/// A payload served by the loader with the size the cache charges for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedResource {
    pub payload: Vec<u8>,
    pub size: usize,
}

// == Resource Loader ==
/// Read-through access to a shared cache.
///
/// The cache lock is never held while the provider is fetching. The lookup
/// and the store each take the write lock once, and the reported size is read
/// under the same lock as the payload.
#[derive(Clone)]
pub struct ResourceLoader {
    cache: Arc<RwLock<CacheStore>>,
    provider: Arc<dyn ResourceProvider>,
}

impl ResourceLoader {
    pub fn new(cache: Arc<RwLock<CacheStore>>, provider: Arc<dyn ResourceProvider>) -> Self {
        Self { cache, provider }
    }

    // == Load ==
    /// Returns the payload for `id` and its charged size, fetching and caching
    /// it on a miss.
    ///
    /// # Errors
    /// Provider failures, and `OversizedResource` / `InsufficientCapacity`
    /// when the fetched resource cannot be cached.
    pub async fn load(&self, id: &str) -> Result<LoadedResource> {
        if let Some(entry) = self.cache.write().await.get_entry(id) {
            return Ok(LoadedResource {
                payload: entry.payload.clone(),
                size: entry.size,
            });
        }

        debug!("Cache miss for {}, fetching from provider", id);
        let provider = Arc::clone(&self.provider);
        let owned_id = id.to_string();
        let fetched = tokio::task::spawn_blocking(move || provider.fetch(&owned_id))
            .await
            .map_err(|e| CacheError::Internal(format!("fetch task failed: {}", e)))??;

        let payload = fetched.payload.clone();
        let mut cache = self.cache.write().await;
        cache.store(
            id.to_string(),
            fetched.payload,
            fetched.priority,
            fetched.size_hint,
        )?;
        let size = cache.peek(id).map_or(payload.len(), |entry| entry.size);
        drop(cache);

        info!(
            "Loaded resource {} ({} bytes, priority: {})",
            id, size, fetched.priority
        );

        Ok(LoadedResource { payload, size })
    }
}
