//! VRAM Cache - A byte-budgeted resource cache server
//!
//! Caches opaque resource payloads under a total byte budget, evicting the
//! least recently used entries with respect to their priority tier.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheConfig, CacheStore, Priority};
pub use config::Config;
pub use error::{CacheError, Result};
pub use provider::{DirectoryProvider, ResourceLoader, ResourceProvider};
pub use tasks::spawn_maintenance_task;
