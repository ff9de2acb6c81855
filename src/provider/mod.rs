//! Resource Provider Module
//!
//! Sources that deliver resources on a cache miss, and the read-through
//! loader that ties them to the cache.
//!
//! The cache core never calls a provider itself; the loader does.

mod directory;
mod loader;

pub use directory::DirectoryProvider;
pub use loader::{LoadedResource, ResourceLoader};

use crate::cache::Priority;
use crate::error::Result;

// == Fetched Resource ==
/// A resource as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub payload: Vec<u8>,
    /// Size to charge instead of the payload length, if known
    pub size_hint: Option<usize>,
    pub priority: Priority,
}

// == Resource Provider ==
/// Remote or local store the cache is filled from.
pub trait ResourceProvider: Send + Sync {
    /// Fetches the resource named `id`.
    ///
    /// # Errors
    /// - `NotFound` if the provider has no such resource
    /// - `InvalidRequest` if `id` is not acceptable to the provider
    /// - `Provider` for any other failure
    fn fetch(&self, id: &str) -> Result<FetchedResource>;
}
