//! ldlmt Core Library
//!
//! Load-shedding admission control for request handlers. An [`AdmissionGate`] bounds
//! the total weight of work executing at once and the number of callers allowed to
//! wait for it; everyone else is rejected immediately.
//!
//! This crate is runtime plumbing only: it reads no environment, writes no logs and
//! knows nothing about HTTP. See `ldlmt-infra` for the axum integration.

pub mod config;
pub mod error;
pub mod gate;
pub mod pool;

// Re-export commonly used types
pub use config::GateConfig;
pub use error::{AcquireError, ErrorMetadata, GateError, FULL_CAPACITY_MESSAGE};
pub use gate::{Admission, AdmissionGate, WeightedGate};
pub use pool::{Lease, Pool};
