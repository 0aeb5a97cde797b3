//! Fixed-size counting pools.
//!
//! A [`Pool`] hands out units as [`Lease`]s. Acquisition is all-or-nothing and atomic
//! with respect to every other acquire/release on the same pool; releasing happens when
//! the lease is dropped, so units come back on every exit path of the holder, including
//! panics and dropped futures.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::AcquireError;

/// Counting resource with a fixed number of units.
///
/// Cloning a `Pool` yields another handle to the same units.
#[derive(Debug, Clone)]
pub struct Pool {
    semaphore: Arc<Semaphore>,
    size: u32,
}

/// Units held from a [`Pool`]. Dropping the lease returns them.
#[derive(Debug)]
#[must_use = "units are released as soon as the lease is dropped"]
pub struct Lease {
    _permit: OwnedSemaphorePermit,
    weight: u32,
}

impl Lease {
    /// Number of units this lease holds.
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Return the units to the pool now.
    pub fn release(self) {
        drop(self);
    }
}

impl Pool {
    /// Create a pool holding `size` units. Sizes beyond what the semaphore can count
    /// are clamped to [`Semaphore::MAX_PERMITS`].
    pub fn new(size: u32) -> Self {
        let permits = (size as usize).min(Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            size: permits as u32,
        }
    }

    /// Total units in the pool.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Units not currently leased.
    pub fn available(&self) -> u32 {
        self.semaphore.available_permits() as u32
    }

    /// Units currently leased.
    pub fn held(&self) -> u32 {
        self.size.saturating_sub(self.available())
    }

    /// Take `units` without waiting. Returns `None` when they are not all free right now.
    pub fn try_acquire(&self, units: u32) -> Option<Lease> {
        Arc::clone(&self.semaphore)
            .try_acquire_many_owned(units)
            .ok()
            .map(|permit| Lease {
                _permit: permit,
                weight: units,
            })
    }

    /// Take `units`, waiting at most `max_wait`.
    ///
    /// Gives up with [`AcquireError::Cancelled`] as soon as `cancel` fires, and without
    /// waiting at all if it has already fired. A request for more units than the pool
    /// holds can never be granted and ends in [`AcquireError::TimedOut`].
    pub async fn acquire(
        &self,
        units: u32,
        max_wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<Lease, AcquireError> {
        if cancel.is_cancelled() {
            return Err(AcquireError::Cancelled);
        }

        let acquire = Arc::clone(&self.semaphore).acquire_many_owned(units);

        // The timer lives inside this select and is dropped with it.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AcquireError::Cancelled),
            result = tokio::time::timeout(max_wait, acquire) => match result {
                Ok(Ok(permit)) => Ok(Lease {
                    _permit: permit,
                    weight: units,
                }),
                // The semaphore is never closed; treat it like a cancellation if it is.
                Ok(Err(_closed)) => Err(AcquireError::Cancelled),
                Err(_elapsed) => Err(AcquireError::TimedOut),
            },
        }
    }
}
