//! Configuration module
//!
//! [`GateConfig`] is the immutable parameter set of one admission gate. Loading it from
//! the environment or a file is the embedding host's job.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

// Common constants
const GATE_CAPACITY: u32 = 10;
const GATE_MAX_WAITERS: u32 = 100;
const GATE_MAX_WAIT_MS: u64 = 500;

/// Parameters of one admission gate, fixed for the gate's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Total weight units allowed to execute at once.
    pub capacity: u32,
    /// Total admission attempts allowed to be pending at once.
    pub max_waiters: u32,
    /// Longest a single attempt may wait for capacity.
    #[serde(rename = "max_wait_ms", with = "duration_millis")]
    pub max_wait: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            capacity: GATE_CAPACITY,
            max_waiters: GATE_MAX_WAITERS,
            max_wait: Duration::from_millis(GATE_MAX_WAIT_MS),
        }
    }
}

impl GateConfig {
    pub fn new(capacity: u32, max_waiters: u32, max_wait: Duration) -> Self {
        Self {
            capacity,
            max_waiters,
            max_wait,
        }
    }

    /// Reject sizes the underlying semaphore cannot represent on this platform.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.capacity as usize > Semaphore::MAX_PERMITS {
            return Err(anyhow::anyhow!(
                "capacity {} exceeds the maximum of {}",
                self.capacity,
                Semaphore::MAX_PERMITS
            ));
        }
        if self.max_waiters as usize > Semaphore::MAX_PERMITS {
            return Err(anyhow::anyhow!(
                "max_waiters {} exceeds the maximum of {}",
                self.max_waiters,
                Semaphore::MAX_PERMITS
            ));
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
