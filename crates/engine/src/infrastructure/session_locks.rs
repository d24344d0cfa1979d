//! Per-player serialization of mutating use cases.

use std::sync::Arc;

use dashmap::DashMap;
use oakhaven_domain::PlayerId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per player, created on first use.
///
/// A use case holds the guard across its whole load, mutate, commit cycle so
/// two requests for the same player never interleave.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: DashMap<PlayerId, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, player_id: PlayerId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard lock is released before awaiting.
        let lock = self
            .locks
            .entry(player_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}
