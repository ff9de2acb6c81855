//! Directory Provider
//!
//! Serves resources from a directory laid out as `<id>.dat` payload files
//! plus an optional `metadata.json` index.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use super::{FetchedResource, ResourceProvider};
use crate::cache::Priority;
use crate::error::{CacheError, Result};

/// Name of the optional metadata index inside the resource directory
pub const METADATA_FILE: &str = "metadata.json";

/// Extension of payload files
pub const PAYLOAD_EXTENSION: &str = "dat";

#[derive(Debug, Default, Deserialize)]
struct MetadataFile {
    #[serde(default)]
    resources: HashMap<String, ResourceMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceMetadata {
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    size: Option<usize>,
}

// == Directory Provider ==
/// File-backed [`ResourceProvider`].
///
/// `metadata.json` has the shape
/// `{"resources": {"<id>": {"priority": 1, "size": 120}}}`; resources without
/// an entry default to `Priority::Normal`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn payload_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.{}", id, PAYLOAD_EXTENSION))
    }

    /// Reads the metadata index. A missing or malformed index counts as empty.
    fn metadata(&self) -> MetadataFile {
        let path = self.root.join(METADATA_FILE);
        match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring malformed {}: {}", path.display(), e);
                MetadataFile::default()
            }),
            Err(_) => MetadataFile::default(),
        }
    }
}

/// Rejects ids that could escape the resource directory.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Resource id cannot be empty".to_string(),
        ));
    }
    if id.contains(['/', '\\', '\0']) || id == "." || id.contains("..") {
        return Err(CacheError::InvalidRequest(format!(
            "Resource id contains illegal characters: {}",
            id
        )));
    }
    Ok(())
}

impl ResourceProvider for DirectoryProvider {
    fn fetch(&self, id: &str) -> Result<FetchedResource> {
        validate_id(id)?;

        let path = self.payload_path(id);
        let payload = fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CacheError::NotFound(id.to_string()),
            _ => CacheError::Provider(format!("failed to read {}: {}", path.display(), e)),
        })?;

        let meta = self.metadata().resources.remove(id).unwrap_or_default();
        let priority = match meta.priority {
            Some(level) => Priority::try_from(level)?,
            None => Priority::default(),
        };

        debug!(
            "Fetched resource {} from {} ({} bytes)",
            id,
            self.root.display(),
            payload.len()
        );

        Ok(FetchedResource {
            payload,
            size_hint: meta.size,
            priority,
        })
    }
}
