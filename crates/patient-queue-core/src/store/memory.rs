//! In-memory snapshot store.

use std::sync::{Arc, Mutex};

use super::{QueueSnapshot, SnapshotStore, StoreError, StoreResult};

/// Keeps the latest snapshot in memory.
///
/// Clones share the same slot, so a caller can keep a handle and inspect
/// what the engine saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<QueueSnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_snapshot(snapshot: QueueSnapshot) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(snapshot))),
        }
    }

    /// The last saved snapshot, if any.
    pub fn snapshot(&self) -> Option<QueueSnapshot> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&mut self) -> StoreResult<Option<QueueSnapshot>> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Lock poisoned: {}", e)))?;
        Ok(slot.clone())
    }

    fn save(&mut self, snapshot: &QueueSnapshot) -> StoreResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Lock poisoned: {}", e)))?;
        *slot = Some(snapshot.clone());
        Ok(())
    }
}
