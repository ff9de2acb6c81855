//! Response DTOs for the resource cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheEntry, Priority};

/// Response body for GET /resources/:id
#[derive(Debug, Clone, Serialize)]
pub struct ResourceResponse {
    pub id: String,
    /// Payload decoded as UTF-8, with invalid sequences replaced
    pub data: String,
    /// Charged payload size in bytes
    pub size: usize,
}

impl ResourceResponse {
    pub fn new(id: impl Into<String>, payload: &[u8], size: usize) -> Self {
        Self {
            id: id.into(),
            data: String::from_utf8_lossy(payload).into_owned(),
            size,
        }
    }
}

/// Response body for PUT /resources/:id
#[derive(Debug, Clone, Serialize)]
pub struct StoreResponse {
    /// Success message
    pub message: String,
    pub id: String,
    pub size: usize,
    pub priority: Priority,
}

impl StoreResponse {
    /// Describes a freshly stored entry.
    pub fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            message: format!("Resource '{}' cached successfully", entry.id),
            id: entry.id.clone(),
            size: entry.size,
            priority: entry.priority,
        }
    }
}

/// Response body for DELETE /resources/:id
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    pub id: String,
}

impl DeleteResponse {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("Resource '{}' removed successfully", id),
            id,
        }
    }
}

/// Response body for PUT /resources/:id/priority
#[derive(Debug, Clone, Serialize)]
pub struct PriorityResponse {
    pub id: String,
    pub priority: Priority,
}

/// Response body for GET /resources
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    /// Filter applied, absent when listing every tier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Ids, most recently used first
    pub resources: Vec<String>,
    pub count: usize,
}

impl ListResponse {
    pub fn new(priority: Option<Priority>, resources: Vec<String>) -> Self {
        Self {
            priority,
            count: resources.len(),
            resources,
        }
    }
}

/// Response body for the cache sweep endpoints (free, optimize, cleanup, clear)
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    /// Entries removed by the sweep
    pub removed: usize,
    /// Bytes charged against the budget afterwards
    pub cache_size: usize,
    pub resource_count: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_response_decodes_payload() {
        let resp = ResourceResponse::new("greeting", b"hello", 5);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["id"], "greeting");
        assert_eq!(json["data"], "hello");
        assert_eq!(json["size"], 5);
    }

    #[test]
    fn test_resource_response_lossy_for_binary() {
        let resp = ResourceResponse::new("blob", &[0xff, b'a'], 2);
        assert_eq!(resp.data, "\u{fffd}a");
    }

    #[test]
    fn test_store_response_from_entry() {
        let entry = CacheEntry::new("atlas".to_string(), vec![0; 8], Priority::Critical, 8, 0);
        let json = serde_json::to_value(StoreResponse::from_entry(&entry)).unwrap();
        assert_eq!(json["id"], "atlas");
        assert_eq!(json["priority"], "critical");
        assert!(json["message"].as_str().unwrap().contains("successfully"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("deleted_id");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("deleted_id"));
        assert!(json.contains("removed"));
    }

    #[test]
    fn test_list_response_omits_missing_filter() {
        let json = serde_json::to_value(ListResponse::new(None, vec!["a".into(), "b".into()])).unwrap();
        assert!(json.get("priority").is_none());
        assert_eq!(json["count"], 2);

        let json = serde_json::to_value(ListResponse::new(Some(Priority::Low), vec![])).unwrap();
        assert_eq!(json["priority"], "low");
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
