//! Queue-management engine.
//!
//! Owns the patient registry and the four department records. Every mutation
//! runs to completion in memory and then hands a full snapshot to the
//! injected [`SnapshotStore`]. A failed save is logged and counted; the
//! in-memory state stays authoritative for the running session.

mod clock;
mod stats;

pub use clock::*;

use std::cmp::Ordering;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::QueueConfig;
use crate::models::{
    validate_new_patient, Department, DepartmentKind, NewPatient, Patient, PatientStatus,
    QueuePosition, ValidationError,
};
use crate::store::{MemoryStore, QueueSnapshot, SnapshotStore};

/// Queue operation errors.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("{department} is already serving token {current_token}")]
    Conflict {
        department: DepartmentKind,
        current_token: u32,
    },

    #[error("Patient {patient_id} is {status}, expected In Progress")]
    InvalidTransition {
        patient_id: String,
        status: PatientStatus,
    },
}

pub type QueueResult<T> = Result<T, QueueError>;

/// Canonical queue order: priority descending, then arrival, then token.
pub fn queue_order(a: &Patient, b: &Patient) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.registration_time.cmp(&b.registration_time))
        .then_with(|| a.token_number.cmp(&b.token_number))
}

/// The authoritative patient queue.
pub struct QueueEngine {
    patients: Vec<Patient>,
    /// Indexed by `DepartmentKind::position`
    departments: Vec<Department>,
    store: Box<dyn SnapshotStore>,
    clock: Box<dyn Clock>,
    config: QueueConfig,
    failed_saves: u64,
}

impl QueueEngine {
    /// Open an engine on the given store using wall-clock time.
    pub fn open<S: SnapshotStore + 'static>(store: S, config: QueueConfig) -> Self {
        Self::open_with_clock(store, SystemClock, config)
    }

    /// Open an engine with an explicit time source.
    ///
    /// Loads the last snapshot from `store`. A missing snapshot or a load
    /// failure starts from the four idle departments and no patients.
    pub fn open_with_clock<S, C>(store: S, clock: C, config: QueueConfig) -> Self
    where
        S: SnapshotStore + 'static,
        C: Clock + 'static,
    {
        let mut store: Box<dyn SnapshotStore> = Box::new(store);

        let snapshot = match store.load() {
            Ok(Some(snapshot)) => {
                info!(
                    patients = snapshot.patients.len(),
                    "Loaded queue snapshot"
                );
                snapshot
            }
            Ok(None) => {
                debug!("No saved queue snapshot, starting fresh");
                QueueSnapshot::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load queue snapshot, starting fresh");
                QueueSnapshot::default()
            }
        };

        let mut engine = Self {
            patients: snapshot.patients,
            departments: Vec::new(),
            store,
            clock: Box::new(clock),
            config,
            failed_saves: 0,
        };
        engine.reconcile_departments(snapshot.departments);
        engine
    }

    /// Engine backed by a fresh [`MemoryStore`] with default config.
    pub fn in_memory() -> Self {
        Self::open(MemoryStore::new(), QueueConfig::default())
    }

    // =========================================================================
    // Core Operations
    // =========================================================================

    /// Register a patient and assign the next token of their department.
    pub fn register_patient(&mut self, data: NewPatient) -> QueueResult<Patient> {
        validate_new_patient(&data)?;

        let department = data.department;
        let token_number = self.patients_in(department).count() as u32 + 1;
        let patient = Patient::new(data, token_number, self.clock.now());

        self.patients.push(patient.clone());
        self.refresh_department(department);

        info!(
            patient_id = %patient.id,
            department = %department,
            token = token_number,
            priority = patient.priority.value(),
            "Registered patient"
        );

        self.persist();
        Ok(patient)
    }

    /// Waiting patients of a department in queue order.
    pub fn waiting_patients(&self, department: DepartmentKind) -> Vec<Patient> {
        let mut waiting: Vec<Patient> = self
            .patients_in(department)
            .filter(|p| p.is_waiting())
            .cloned()
            .collect();
        waiting.sort_by(queue_order);
        waiting
    }

    /// Move the head of a department's queue into service.
    ///
    /// Returns `Ok(None)` when nobody is waiting. Fails with
    /// [`QueueError::Conflict`] while the department is still serving
    /// someone; complete that patient first.
    pub fn call_next_patient(&mut self, department: DepartmentKind) -> QueueResult<Option<Patient>> {
        let Some(index) = self.queue_head(department) else {
            debug!(department = %department, "No patients waiting");
            return Ok(None);
        };

        if let Some(current_token) = self.departments[department.position()].current_token {
            return Err(QueueError::Conflict {
                department,
                current_token,
            });
        }

        let now = self.clock.now();
        let patient = &mut self.patients[index];
        patient.status = PatientStatus::InProgress;
        patient.called_time = Some(now);
        let called = patient.clone();

        self.departments[department.position()].current_token = Some(called.token_number);
        self.refresh_department(department);

        info!(
            patient_id = %called.id,
            department = %department,
            token = called.token_number,
            "Called patient"
        );

        self.persist();
        Ok(Some(called))
    }

    /// Finish service for an in-progress patient.
    pub fn complete_patient(&mut self, patient_id: &str) -> QueueResult<()> {
        let index = self
            .patients
            .iter()
            .position(|p| p.id == patient_id)
            .ok_or_else(|| QueueError::NotFound(patient_id.to_string()))?;

        let patient = &mut self.patients[index];
        if !patient.is_in_progress() {
            return Err(QueueError::InvalidTransition {
                patient_id: patient_id.to_string(),
                status: patient.status,
            });
        }

        patient.status = PatientStatus::Completed;
        patient.completion_time = Some(self.clock.now());
        let department = patient.department;
        let token_number = patient.token_number;

        let record = &mut self.departments[department.position()];
        record.total_served += 1;
        if record.current_token == Some(token_number) {
            record.current_token = None;
        }
        self.refresh_department(department);

        info!(
            patient_id = %patient_id,
            department = %department,
            token = token_number,
            "Completed patient"
        );

        self.persist();
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Look up a patient by id.
    pub fn patient(&self, patient_id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == patient_id)
    }

    /// Look up a patient by department and token.
    pub fn find_by_token(&self, department: DepartmentKind, token_number: u32) -> Option<&Patient> {
        self.patients_in(department)
            .find(|p| p.token_number == token_number)
    }

    /// Every registered patient, in registration order.
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Patients currently being served, across all departments.
    pub fn in_progress_patients(&self) -> Vec<Patient> {
        self.patients
            .iter()
            .filter(|p| p.is_in_progress())
            .cloned()
            .collect()
    }

    pub fn department(&self, department: DepartmentKind) -> &Department {
        &self.departments[department.position()]
    }

    /// The four departments in display order.
    pub fn department_listing(&self) -> &[Department] {
        &self.departments
    }

    /// Queue position and fixed-rate wait estimate for a patient.
    pub fn queue_position(&self, patient_id: &str) -> QueueResult<QueuePosition> {
        let patient = self
            .patient(patient_id)
            .ok_or_else(|| QueueError::NotFound(patient_id.to_string()))?;

        let position = self
            .waiting_patients(patient.department)
            .iter()
            .position(|p| p.id == patient.id)
            .map(|index| index as u32 + 1)
            .unwrap_or(0);

        Ok(QueuePosition {
            patient_id: patient.id.clone(),
            token_number: patient.token_number,
            position,
            estimated_wait_minutes: position * self.config.estimated_service_minutes,
        })
    }

    /// Copy of the full state, as handed to the store.
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            patients: self.patients.clone(),
            departments: self.departments.clone(),
        }
    }

    /// Current time according to the engine clock.
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Number of saves that failed since the engine was opened.
    pub fn failed_saves(&self) -> u64 {
        self.failed_saves
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn patients_in(&self, department: DepartmentKind) -> impl Iterator<Item = &Patient> {
        self.patients
            .iter()
            .filter(move |p| p.department == department)
    }

    /// Index of the patient at the head of the department's queue.
    fn queue_head(&self, department: DepartmentKind) -> Option<usize> {
        self.patients
            .iter()
            .enumerate()
            .filter(|(_, p)| p.department == department && p.is_waiting())
            .min_by(|(_, a), (_, b)| queue_order(a, b))
            .map(|(index, _)| index)
    }

    /// Recompute the derived counters of a department from the registry.
    fn refresh_department(&mut self, department: DepartmentKind) {
        let waiting_count = self
            .patients_in(department)
            .filter(|p| p.is_waiting())
            .count() as u32;
        let next_token = self
            .queue_head(department)
            .map(|index| self.patients[index].token_number);

        let record = &mut self.departments[department.position()];
        record.waiting_count = waiting_count;
        record.next_token = next_token;
    }

    /// Rebuild the department table from loaded records.
    ///
    /// Missing departments come back idle; `current_token` is aligned with
    /// the patients actually in progress.
    fn reconcile_departments(&mut self, loaded: Vec<Department>) {
        let mut departments = Vec::with_capacity(DepartmentKind::ALL.len());

        for kind in DepartmentKind::ALL {
            let mut record = loaded
                .iter()
                .find(|d| d.kind() == Some(kind))
                .cloned()
                .unwrap_or_else(|| Department::new(kind));

            let serving: Vec<&Patient> = self
                .patients_in(kind)
                .filter(|p| p.is_in_progress())
                .collect();
            let recorded_is_serving = record
                .current_token
                .is_some_and(|token| serving.iter().any(|p| p.token_number == token));
            if !recorded_is_serving {
                record.current_token = serving
                    .iter()
                    .max_by_key(|p| p.called_time)
                    .map(|p| p.token_number);
            }

            departments.push(record);
        }

        self.departments = departments;
        for kind in DepartmentKind::ALL {
            self.refresh_department(kind);
        }
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        match self.store.save(&snapshot) {
            Ok(()) => debug!(patients = snapshot.patients.len(), "Saved queue snapshot"),
            Err(e) => {
                self.failed_saves += 1;
                error!(error = %e, "Failed to save queue snapshot");
            }
        }
    }
}
