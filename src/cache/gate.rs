//! Admission control for outbound fetches

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

/// Bounds how many rating fetches may run at the same time.
///
/// Built once from configuration when the service starts. Callers that cannot
/// get a slot quickly skip the fetch instead of queueing behind the others.
#[derive(Debug, Clone)]
pub struct FetchGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held fetch slot. Dropping it releases the slot, including on early
/// return or panic of the task that holds it.
#[derive(Debug)]
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
}

impl FetchGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits at most `timeout` for a free slot.
    pub async fn try_acquire(&self, timeout: Duration) -> Option<FetchPermit> {
        match tokio::time::timeout(timeout, Arc::clone(&self.semaphore).acquire_owned()).await {
            Ok(Ok(permit)) => Some(FetchPermit { _permit: permit }),
            Ok(Err(_closed)) => None,
            Err(_elapsed) => {
                trace!("No fetch slot available within {timeout:?}");
                None
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Refuses all further acquisitions. Held permits stay valid.
    pub fn close(&self) {
        self.semaphore.close();
    }
}
