//! ldlmt Infrastructure Library
//!
//! This crate connects the admission gate to an HTTP host:
//! - Middleware applying a weighted gate to axum routes
//! - HTTP error conversion for gate rejections
//! - Telemetry initialization (tracing)

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{apply, load_limit_middleware};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

pub use error::HttpGateError;
