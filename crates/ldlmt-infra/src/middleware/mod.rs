//! Shared HTTP middleware for ldlmt hosts

pub mod load_limit;

pub use load_limit::{apply, load_limit_middleware};
