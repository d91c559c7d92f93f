//! In-flight call accounting, so shutdown can wait for running calls.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Permits handed out to calls. Draining takes every one of them back.
const CALL_PERMITS: u32 = 1 << 20;

/// Admits calls until draining starts.
///
/// Each admitted call holds one permit for its whole run. `drain` queues
/// for all permits at once, which refuses new calls immediately and
/// resolves when the last admitted call drops its permit.
#[derive(Debug, Clone)]
pub struct InFlight {
    permits: Arc<Semaphore>,
}

impl InFlight {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(CALL_PERMITS as usize)),
        }
    }

    /// Admit one call, or `None` once draining has started.
    pub fn enter(&self) -> Option<OwnedSemaphorePermit> {
        self.permits.clone().try_acquire_owned().ok()
    }

    /// Number of admitted calls still running.
    pub fn active(&self) -> usize {
        if self.permits.is_closed() {
            return 0;
        }
        CALL_PERMITS as usize - self.permits.available_permits()
    }

    /// Refuse new calls and wait for admitted ones to finish.
    pub async fn drain(&self) {
        if let Ok(all) = self.permits.acquire_many(CALL_PERMITS).await {
            self.permits.close();
            drop(all);
        }
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}
