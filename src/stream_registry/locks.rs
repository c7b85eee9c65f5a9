//! Per-stream-ID exclusion
//!
//! Registry mutations for the same ID must not interleave: restart spans a
//! teardown, a delay, and a re-add, and a concurrent add/remove in that
//! window would race with the pending re-add. Each ID gets its own async
//! mutex; guards are owned so they can be held across await points.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Per-ID lock map
#[derive(Default)]
pub struct StreamLocks {
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl StreamLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a stream ID, waiting if another operation on
    /// the same ID is in flight.
    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        let lock = self.get_or_create_lock(id).await;
        let guard = lock.lock_owned().await;
        tracing::debug!(id = id, "stream lock acquired");
        guard
    }

    async fn get_or_create_lock(&self, id: &str) -> Arc<Mutex<()>> {
        // Read lock first; most IDs already have an entry
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(id) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().await;
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
