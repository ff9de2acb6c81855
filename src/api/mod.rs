//! API Module
//!
//! HTTP handlers and routing for the resource cache REST API.
//!
//! # Endpoints
//! - `/resources` - Store, fetch, list, remove and re-prioritize resources
//! - `/cache` - Memory sweeps (free, optimize, cleanup, clear)
//! - `/stats` - Cache snapshot and counter reset
//! - `/health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
