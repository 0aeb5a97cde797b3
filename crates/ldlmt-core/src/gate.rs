//! Two-tier admission gate.
//!
//! An attempt first takes one waiter slot without blocking, then waits up to
//! `max_wait` for its weight in capacity units. The waiter slot is given back before
//! the protected work starts; the capacity units are given back when the work ends.
//!
//! ```rust,ignore
//! let gate = Arc::new(AdmissionGate::new(10, 5, Duration::from_millis(50)));
//! let heavy = gate.weighted(4);
//! let rows = heavy.run(|| load_report(id)).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::GateConfig;
use crate::error::GateError;
use crate::pool::{Lease, Pool};

/// Bounds concurrent weighted work and the number of callers waiting for it.
#[derive(Debug)]
pub struct AdmissionGate {
    config: GateConfig,
    waiters: Pool,
    capacity: Pool,
    shutdown: CancellationToken,
}

/// Capacity held by an admitted request. Dropping it returns the units.
#[derive(Debug)]
#[must_use = "capacity is released as soon as the admission is dropped"]
pub struct Admission {
    lease: Lease,
}

impl Admission {
    pub fn weight(&self) -> u32 {
        self.lease.weight()
    }
}

impl AdmissionGate {
    pub fn new(capacity: u32, max_waiters: u32, max_wait: Duration) -> Self {
        Self::from_config(GateConfig::new(capacity, max_waiters, max_wait))
    }

    pub fn from_config(config: GateConfig) -> Self {
        Self {
            waiters: Pool::new(config.max_waiters),
            capacity: Pool::new(config.capacity),
            shutdown: CancellationToken::new(),
            config,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Pool of waiter slots (size `max_waiters`).
    pub fn waiters(&self) -> &Pool {
        &self.waiters
    }

    /// Pool of capacity units (size `capacity`).
    pub fn capacity(&self) -> &Pool {
        &self.capacity
    }

    /// Bind this gate to a weight. All handles drawn from one gate share its pools.
    pub fn weighted(self: &Arc<Self>, weight: u32) -> WeightedGate {
        WeightedGate {
            gate: Arc::clone(self),
            weight,
        }
    }

    /// Stop granting capacity. Attempts already waiting give up at once and later
    /// attempts are rejected without waiting. Work already admitted is unaffected.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Run the admission protocol for one request of `weight` units.
    ///
    /// On success the returned [`Admission`] holds the capacity; the waiter slot has
    /// already been released. On failure nothing is held.
    pub async fn admit(&self, weight: u32) -> Result<Admission, GateError> {
        let waiter = self.waiters.try_acquire(1).ok_or(GateError::QueueFull {
            max_waiters: self.config.max_waiters,
        })?;

        let acquired = self
            .capacity
            .acquire(weight, self.config.max_wait, &self.shutdown)
            .await;

        // Waiter slots are queue positions, never held while work runs.
        drop(waiter);

        match acquired {
            Ok(lease) => Ok(Admission { lease }),
            Err(_) => Err(GateError::CapacityTimeout {
                weight,
                max_wait: self.config.max_wait,
            }),
        }
    }

    /// Admit a request of `weight` units and run `work` under the admission.
    ///
    /// `work` is only called once admitted. Its output is returned as-is inside `Ok`,
    /// so an error produced by the work reaches the caller unchanged. The capacity is
    /// released after `work` finishes, panics, or is dropped mid-flight.
    pub async fn run<F, Fut>(&self, weight: u32, work: F) -> Result<Fut::Output, GateError>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let admission = self.admit(weight).await?;
        let output = work().await;
        drop(admission);
        Ok(output)
    }
}

/// A shared [`AdmissionGate`] together with the weight of one kind of work.
#[derive(Debug, Clone)]
pub struct WeightedGate {
    gate: Arc<AdmissionGate>,
    weight: u32,
}

impl WeightedGate {
    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn gate(&self) -> &Arc<AdmissionGate> {
        &self.gate
    }

    pub async fn admit(&self) -> Result<Admission, GateError> {
        self.gate.admit(self.weight).await
    }

    pub async fn run<F, Fut>(&self, work: F) -> Result<Fut::Output, GateError>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        self.gate.run(self.weight, work).await
    }
}
