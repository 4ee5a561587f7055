//! Snapshot persistence for the queue engine.
//!
//! The engine loads one snapshot at startup and hands the full state back
//! after every mutation. Implementations:
//!
//! - [`MemoryStore`]: keeps the last snapshot in memory (tests, kiosks without disk)
//! - [`crate::db::Database`]: SQLite-backed store

mod memory;

pub use memory::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DbError;
use crate::models::{Department, Patient};

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Full engine state as handed to and from storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueueSnapshot {
    pub patients: Vec<Patient>,
    pub departments: Vec<Department>,
}

/// Storage collaborator for engine snapshots.
pub trait SnapshotStore: Send {
    /// Load the last saved snapshot, `None` if nothing was saved yet.
    fn load(&mut self) -> StoreResult<Option<QueueSnapshot>>;

    /// Persist the full snapshot.
    fn save(&mut self, snapshot: &QueueSnapshot) -> StoreResult<()>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&mut self) -> StoreResult<Option<QueueSnapshot>> {
        (**self).load()
    }

    fn save(&mut self, snapshot: &QueueSnapshot) -> StoreResult<()> {
        (**self).save(snapshot)
    }
}
