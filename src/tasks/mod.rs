//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Maintenance: expires idle entries and trims an over-budget cache

mod maintenance;

pub use maintenance::{run_maintenance, spawn_maintenance_task, MaintenanceReport};
