//! API Handlers
//!
//! HTTP request handlers for each resource cache endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::{CacheSnapshot, CacheStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_id, CleanupRequest, DeleteResponse, FreeMemoryRequest, HealthResponse, ListQuery,
    ListResponse, PriorityRequest, PriorityResponse, ResourceResponse, StoreRequest,
    StoreResponse, SweepResponse,
};
use crate::provider::{DirectoryProvider, ResourceLoader, ResourceProvider};

/// Application state shared across all handlers.
///
/// Owns the single cache store; `loader` is set when a resource provider is
/// configured, turning resource reads into read-through loads.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
    /// Read-through loader, if a provider is configured
    pub loader: Option<ResourceLoader>,
}

impl AppState {
    /// Creates a new AppState around an already started cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            loader: None,
        }
    }

    /// Serves cache misses from `provider`.
    pub fn with_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.loader = Some(ResourceLoader::new(self.cache.clone(), provider));
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts the cache store and attaches a directory provider when
    /// `resource_dir` is set.
    pub fn from_config(config: &Config) -> Self {
        let mut cache = CacheStore::new(config.cache_config());
        cache.begin();
        let state = Self::new(cache);

        match &config.resource_dir {
            Some(dir) => {
                let provider = DirectoryProvider::new(dir.clone());
                info!("Read-through provider serving {}", provider.root().display());
                state.with_provider(Arc::new(provider))
            }
            None => state,
        }
    }
}

// == Resource Handlers ==

/// Handler for PUT /resources/:id
///
/// Stores a resource, evicting colder entries if the budget requires it.
pub async fn store_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<StoreResponse>> {
    if let Some(error_msg) = validate_id(&id) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    cache.store(
        id.clone(),
        req.data.into_bytes(),
        req.priority.unwrap_or_default(),
        req.size_hint,
    )?;

    cache
        .peek(&id)
        .map(|entry| Json(StoreResponse::from_entry(entry)))
        .ok_or_else(|| CacheError::Internal(format!("stored resource {} vanished", id)))
}

/// Handler for GET /resources/:id
///
/// Returns the cached payload, loading it from the provider on a miss when
/// one is configured.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResourceResponse>> {
    let response = match &state.loader {
        Some(loader) => {
            let loaded = loader.load(&id).await?;
            ResourceResponse::new(id, &loaded.payload, loaded.size)
        }
        None => {
            // Write lock: a lookup updates recency and stats
            let mut cache = state.cache.write().await;
            let entry = cache
                .get_entry(&id)
                .ok_or_else(|| CacheError::NotFound(id.clone()))?;
            ResourceResponse::new(entry.id.clone(), &entry.payload, entry.size)
        }
    };

    Ok(Json(response))
}

/// Handler for DELETE /resources/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    if !cache.remove(&id) {
        return Err(CacheError::NotFound(id));
    }

    Ok(Json(DeleteResponse::new(id)))
}

/// Handler for GET /resources?priority=
///
/// Lists ids most recently used first, optionally restricted to one tier.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let priority = query.priority()?;

    let cache = state.cache.read().await;
    let resources = match priority {
        Some(priority) => cache.resources_by_priority(priority),
        None => cache.resources(),
    };

    Ok(Json(ListResponse::new(priority, resources)))
}

/// Handler for PUT /resources/:id/priority
pub async fn priority_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PriorityRequest>,
) -> Result<Json<PriorityResponse>> {
    let mut cache = state.cache.write().await;
    if !cache.update_priority(&id, req.priority) {
        return Err(CacheError::NotFound(id));
    }

    Ok(Json(PriorityResponse {
        id,
        priority: req.priority,
    }))
}

// == Cache Handlers ==

/// Handler for POST /cache/free
pub async fn free_memory_handler(
    State(state): State<AppState>,
    Json(req): Json<FreeMemoryRequest>,
) -> Json<SweepResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.free_memory(req.target_bytes);
    Json(sweep_response(&cache, removed))
}

/// Handler for POST /cache/optimize
pub async fn optimize_handler(State(state): State<AppState>) -> Json<SweepResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.optimize_cache();
    Json(sweep_response(&cache, removed))
}

/// Handler for POST /cache/cleanup
///
/// The body is optional; without `max_age_ms` the configured expiry age applies.
pub async fn cleanup_handler(
    State(state): State<AppState>,
    req: Option<Json<CleanupRequest>>,
) -> Json<SweepResponse> {
    let max_age_ms = req.and_then(|Json(req)| req.max_age_ms);

    let mut cache = state.cache.write().await;
    let removed = match max_age_ms {
        Some(max_age_ms) => cache.cleanup_expired(max_age_ms),
        None => cache.cleanup_expired_default(),
    };
    Json(sweep_response(&cache, removed))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<SweepResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.resource_count();
    cache.clear();
    Json(sweep_response(&cache, removed))
}

fn sweep_response(cache: &CacheStore, removed: usize) -> SweepResponse {
    SweepResponse {
        removed,
        cache_size: cache.cache_size(),
        resource_count: cache.resource_count(),
    }
}

// == Monitoring Handlers ==

/// Handler for GET /stats
///
/// Returns counters plus the most recently used entries.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheSnapshot> {
    let cache = state.cache.read().await;
    Json(cache.snapshot())
}

/// Handler for POST /stats/reset
pub async fn reset_stats_handler(State(state): State<AppState>) -> Json<CacheSnapshot> {
    let mut cache = state.cache.write().await;
    cache.reset_stats();
    Json(cache.snapshot())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
