//! SQLite-backed snapshot store.

use tracing::debug;

use super::departments::upsert_department;
use super::patients::upsert_patient;
use super::Database;
use crate::store::{QueueSnapshot, SnapshotStore, StoreResult};

impl SnapshotStore for Database {
    fn load(&mut self) -> StoreResult<Option<QueueSnapshot>> {
        let patients = self.list_patients()?;
        let departments = self.list_departments()?;
        debug!(patients = patients.len(), "Read snapshot from SQLite");

        Ok(Some(QueueSnapshot {
            patients,
            departments,
        }))
    }

    /// Upserts every patient and department in one transaction.
    fn save(&mut self, snapshot: &QueueSnapshot) -> StoreResult<()> {
        let tx = self.transaction()?;
        for patient in &snapshot.patients {
            upsert_patient(&tx, patient)?;
        }
        for department in &snapshot.departments {
            upsert_department(&tx, department)?;
        }
        tx.commit().map_err(super::DbError::from)?;
        Ok(())
    }
}
