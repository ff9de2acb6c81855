//! Request DTOs for the resource cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::cache::Priority;

/// Maximum accepted resource id length
pub const MAX_ID_LENGTH: usize = 256;

/// Checks an id taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_id(id: &str) -> Option<String> {
    if id.is_empty() {
        return Some("Resource id cannot be empty".to_string());
    }
    if id.len() > MAX_ID_LENGTH {
        return Some(format!(
            "Resource id exceeds maximum length of {} characters",
            MAX_ID_LENGTH
        ));
    }
    None
}

/// Request body for PUT /resources/:id
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    /// Payload text, stored as its UTF-8 bytes
    pub data: String,
    /// Tier name such as "critical"; Normal when omitted
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Charged size in bytes, overriding the payload length when positive
    #[serde(default)]
    pub size_hint: Option<usize>,
}

/// Request body for PUT /resources/:id/priority
#[derive(Debug, Clone, Deserialize)]
pub struct PriorityRequest {
    pub priority: Priority,
}

/// Request body for POST /cache/free
#[derive(Debug, Clone, Deserialize)]
pub struct FreeMemoryRequest {
    /// Bytes to reclaim
    pub target_bytes: usize,
}

/// Request body for POST /cache/cleanup
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanupRequest {
    /// Idle age in milliseconds; the configured expiry age when omitted
    #[serde(default)]
    pub max_age_ms: Option<u64>,
}

/// Query string for GET /resources
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Tier filter, by name or level
    #[serde(default)]
    pub priority: Option<String>,
}

impl ListQuery {
    /// Parses the tier filter, if any.
    pub fn priority(&self) -> crate::error::Result<Option<Priority>> {
        self.priority.as_deref().map(str::parse::<Priority>).transpose()
    }
}
