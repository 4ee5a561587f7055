//! Patient Queue Core Library
//!
//! Hospital patient-queue tracker: registration, token assignment, priority
//! ordering and service tracking across four fixed departments.
//!
//! # Architecture
//!
//! ```text
//!  Registration desk / Admin panel / Display board  (UI, CLI, FFI host)
//!                          │
//!                          ▼
//!          ┌───────────────────────────────┐
//!          │          QueueEngine          │
//!          │  register → waiting → call →  │
//!          │  complete, stats, lookups     │
//!          └───────────────┬───────────────┘
//!                          │ snapshot after every mutation
//!                          ▼
//!                   SnapshotStore
//!              (SQLite Database / Memory)
//! ```
//!
//! # Queue Rule
//!
//! **Emergency > senior citizen > regular**, earlier arrivals first within a
//! priority class. A department serves one patient at a time.
//!
//! # Modules
//!
//! - [`engine`]: The queue engine and its statistics
//! - [`models`]: Domain types (Patient, Department, QueueStats, etc.)
//! - [`store`]: Snapshot persistence trait and in-memory store
//! - [`db`]: SQLite snapshot store
//! - [`export`]: Display board and daily roster export
//! - [`config`]: Engine tunables

pub mod config;
pub mod db;
pub mod engine;
pub mod export;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use config::{QueueConfig, WaitTimeMetric};
pub use db::Database;
pub use engine::{Clock, ManualClock, QueueEngine, QueueError, QueueResult, SystemClock};
pub use export::{BoardExporter, DisplayBoard, Roster, RosterExporter};
pub use models::{
    Department, DepartmentKind, Gender, NewPatient, Patient, PatientStatus, Priority,
    QueuePosition, QueueStats, RegistrationForm, ValidationError, VisitType,
};
pub use store::{MemoryStore, QueueSnapshot, SnapshotStore, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PatientQueueError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<QueueError> for PatientQueueError {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::Validation(_) => PatientQueueError::ValidationError(e.to_string()),
            QueueError::NotFound(id) => PatientQueueError::NotFound(id),
            QueueError::Conflict { .. } => PatientQueueError::Conflict(e.to_string()),
            QueueError::InvalidTransition { .. } => {
                PatientQueueError::InvalidTransition(e.to_string())
            }
        }
    }
}

impl From<ValidationError> for PatientQueueError {
    fn from(e: ValidationError) -> Self {
        PatientQueueError::ValidationError(e.to_string())
    }
}

impl From<db::DbError> for PatientQueueError {
    fn from(e: db::DbError) -> Self {
        PatientQueueError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for PatientQueueError {
    fn from(e: serde_json::Error) -> Self {
        PatientQueueError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PatientQueueError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PatientQueueError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_department(department: &str) -> Result<DepartmentKind, PatientQueueError> {
    department
        .parse()
        .map_err(PatientQueueError::InvalidInput)
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a queue database at the given path.
#[uniffi::export]
pub fn open_queue(path: String) -> Result<Arc<PatientQueueCore>, PatientQueueError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(PatientQueueCore::new(QueueEngine::open(
        db,
        QueueConfig::default(),
    ))))
}

/// Create an in-memory queue (for testing).
#[uniffi::export]
pub fn open_queue_in_memory() -> Result<Arc<PatientQueueCore>, PatientQueueError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(PatientQueueCore::new(QueueEngine::open(
        db,
        QueueConfig::default(),
    ))))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe engine wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PatientQueueCore {
    engine: Arc<Mutex<QueueEngine>>,
}

impl PatientQueueCore {
    /// Wrap an engine built by a Rust composition root.
    pub fn new(engine: QueueEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }
}

#[uniffi::export]
impl PatientQueueCore {
    // =========================================================================
    // Queue Operations
    // =========================================================================

    /// Register a patient from a raw form.
    pub fn register_patient(
        &self,
        form: FfiRegistrationForm,
    ) -> Result<FfiPatient, PatientQueueError> {
        let new_patient = RegistrationForm::from(form).validate()?;
        let mut engine = self.engine.lock()?;
        let patient = engine.register_patient(new_patient)?;
        Ok(patient.into())
    }

    /// Waiting patients of a department in queue order.
    pub fn waiting_patients(
        &self,
        department: String,
    ) -> Result<Vec<FfiPatient>, PatientQueueError> {
        let department = parse_department(&department)?;
        let engine = self.engine.lock()?;
        Ok(engine
            .waiting_patients(department)
            .into_iter()
            .map(|p| p.into())
            .collect())
    }

    /// Call the next patient of a department; `None` when nobody waits.
    pub fn call_next_patient(
        &self,
        department: String,
    ) -> Result<Option<FfiPatient>, PatientQueueError> {
        let department = parse_department(&department)?;
        let mut engine = self.engine.lock()?;
        let called = engine.call_next_patient(department)?;
        Ok(called.map(|p| p.into()))
    }

    /// Mark an in-progress patient as completed.
    pub fn complete_patient(&self, patient_id: String) -> Result<(), PatientQueueError> {
        let mut engine = self.engine.lock()?;
        engine.complete_patient(&patient_id)?;
        Ok(())
    }

    /// Today's statistics.
    pub fn queue_stats(&self) -> Result<FfiQueueStats, PatientQueueError> {
        let engine = self.engine.lock()?;
        Ok(engine.queue_stats().into())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// All departments in display order.
    pub fn departments(&self) -> Result<Vec<FfiDepartment>, PatientQueueError> {
        let engine = self.engine.lock()?;
        Ok(engine
            .department_listing()
            .iter()
            .cloned()
            .map(|d| d.into())
            .collect())
    }

    /// Find a patient by department and token.
    pub fn find_by_token(
        &self,
        department: String,
        token_number: u32,
    ) -> Result<Option<FfiPatient>, PatientQueueError> {
        let department = parse_department(&department)?;
        let engine = self.engine.lock()?;
        Ok(engine
            .find_by_token(department, token_number)
            .cloned()
            .map(|p| p.into()))
    }

    /// Queue position and estimated wait for a patient.
    pub fn queue_position(
        &self,
        patient_id: String,
    ) -> Result<FfiQueuePosition, PatientQueueError> {
        let engine = self.engine.lock()?;
        Ok(engine.queue_position(&patient_id)?.into())
    }

    /// Patients currently being served.
    pub fn in_progress_patients(&self) -> Result<Vec<FfiPatient>, PatientQueueError> {
        let engine = self.engine.lock()?;
        Ok(engine
            .in_progress_patients()
            .into_iter()
            .map(|p| p.into())
            .collect())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Display board as JSON.
    pub fn export_board_json(&self) -> Result<String, PatientQueueError> {
        let engine = self.engine.lock()?;
        let board = BoardExporter::new(&engine).export();
        Ok(board.to_json()?)
    }

    /// Today's roster as CSV.
    pub fn export_roster_csv(&self) -> Result<String, PatientQueueError> {
        let engine = self.engine.lock()?;
        Ok(RosterExporter::new(&engine).export_today().to_csv())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe registration form. Missing values are reported as validation errors.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRegistrationForm {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub visit_type: Option<String>,
}

impl From<FfiRegistrationForm> for RegistrationForm {
    fn from(form: FfiRegistrationForm) -> Self {
        RegistrationForm {
            name: form.name,
            age: form.age,
            gender: form.gender,
            department: form.department,
            visit_type: form.visit_type,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub token_number: u32,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub department: String,
    pub visit_type: String,
    pub registration_time: String,
    pub status: String,
    pub priority: u8,
    pub is_emergency: bool,
    pub is_senior_citizen: bool,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            token_number: patient.token_number,
            name: patient.name,
            age: patient.age,
            gender: patient.gender.as_str().to_string(),
            department: patient.department.name().to_string(),
            visit_type: patient.visit_type.as_str().to_string(),
            registration_time: patient.registration_time.to_rfc3339(),
            status: patient.status.as_str().to_string(),
            priority: patient.priority.value(),
            is_emergency: patient.is_emergency,
            is_senior_citizen: patient.is_senior_citizen,
        }
    }
}

/// FFI-safe department.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDepartment {
    pub id: String,
    pub name: String,
    pub current_token: Option<u32>,
    pub next_token: Option<u32>,
    pub total_served: u32,
    pub waiting_count: u32,
}

impl From<Department> for FfiDepartment {
    fn from(department: Department) -> Self {
        Self {
            id: department.id,
            name: department.name,
            current_token: department.current_token,
            next_token: department.next_token,
            total_served: department.total_served,
            waiting_count: department.waiting_count,
        }
    }
}

/// FFI-safe statistics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQueueStats {
    pub total_patients: u32,
    pub average_wait_time: u32,
    pub busiest_department: String,
    pub total_served_today: u32,
}

impl From<QueueStats> for FfiQueueStats {
    fn from(stats: QueueStats) -> Self {
        Self {
            total_patients: stats.total_patients,
            average_wait_time: stats.average_wait_time,
            busiest_department: stats.busiest_department,
            total_served_today: stats.total_served_today,
        }
    }
}

/// FFI-safe queue position.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQueuePosition {
    pub patient_id: String,
    pub token_number: u32,
    pub position: u32,
    pub estimated_wait_minutes: u32,
}

impl From<QueuePosition> for FfiQueuePosition {
    fn from(position: QueuePosition) -> Self {
        Self {
            patient_id: position.patient_id,
            token_number: position.token_number,
            position: position.position,
            estimated_wait_minutes: position.estimated_wait_minutes,
        }
    }
}
