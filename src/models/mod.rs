//! Request and Response models for the resource cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    validate_id, CleanupRequest, FreeMemoryRequest, ListQuery, PriorityRequest, StoreRequest,
};
pub use responses::{
    DeleteResponse, ErrorResponse, HealthResponse, ListResponse, PriorityResponse,
    ResourceResponse, StoreResponse, SweepResponse,
};
