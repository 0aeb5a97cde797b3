//! Error types module
//!
//! This module provides the rejection outcomes of the admission gate. Both variants
//! describe a caller that was turned away before its protected work ran; errors raised
//! by the protected work itself never pass through these types.

use std::time::Duration;

/// Client-facing body for every rejection.
pub const FULL_CAPACITY_MESSAGE: &str = "server is at full capacity";

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "QUEUE_FULL")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;
}

/// Why an admission attempt was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Every waiter slot was taken at the moment of the attempt.
    #[error("Waiter queue full: all {max_waiters} waiter slots are taken")]
    QueueFull { max_waiters: u32 },

    /// A waiter slot was held but `weight` capacity units were not granted in time,
    /// or the gate was shut down while waiting.
    #[error("Capacity timeout: {weight} units not granted within {max_wait:?}")]
    CapacityTimeout { weight: u32, max_wait: Duration },
}

/// Why a blocking pool acquisition gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    #[error("timed out waiting for pool units")]
    TimedOut,

    #[error("acquisition cancelled")]
    Cancelled,
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action).
fn gate_error_static_metadata(err: &GateError) -> (u16, &'static str, bool, Option<&'static str>) {
    match err {
        GateError::QueueFull { .. } => (
            503,
            "QUEUE_FULL",
            true,
            Some("Retry after a short delay"),
        ),
        GateError::CapacityTimeout { .. } => (
            503,
            "CAPACITY_TIMEOUT",
            true,
            Some("Retry after a short delay"),
        ),
    }
}

impl ErrorMetadata for GateError {
    fn http_status_code(&self) -> u16 {
        gate_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        gate_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        gate_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        gate_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        FULL_CAPACITY_MESSAGE.to_string()
    }
}
