//! Patient database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Database, DbError, DbResult};
use crate::models::{DepartmentKind, Patient, Priority};

const PATIENT_COLUMNS: &str = r#"
    id, token_number, name, age, gender, department, visit_type,
    registration_time, status, priority, is_emergency, is_senior_citizen,
    called_time, completion_time
"#;

impl Database {
    /// Insert or update a patient.
    pub fn upsert_patient(&self, patient: &Patient) -> DbResult<()> {
        upsert_patient(&self.conn, patient)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                PatientRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List all patients in registration order.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY registration_time, department, token_number",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], PatientRow::from_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// List the patients of one department by token.
    pub fn list_patients_for_department(&self, department: DepartmentKind) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients WHERE department = ? ORDER BY token_number",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([department.name()], PatientRow::from_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }
}

pub(super) fn upsert_patient(conn: &Connection, patient: &Patient) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO patients (
            id, token_number, name, age, gender, department, visit_type,
            registration_time, status, priority, is_emergency, is_senior_citizen,
            called_time, completion_time
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        ON CONFLICT(id) DO UPDATE SET
            status = excluded.status,
            called_time = excluded.called_time,
            completion_time = excluded.completion_time
        "#,
        params![
            patient.id,
            patient.token_number,
            patient.name,
            patient.age,
            patient.gender.as_str(),
            patient.department.name(),
            patient.visit_type.as_str(),
            format_timestamp(&patient.registration_time),
            patient.status.as_str(),
            patient.priority.value(),
            patient.is_emergency,
            patient.is_senior_citizen,
            patient.called_time.as_ref().map(format_timestamp),
            patient.completion_time.as_ref().map(format_timestamp),
        ],
    )?;
    Ok(())
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    token_number: u32,
    name: String,
    age: u32,
    gender: String,
    department: String,
    visit_type: String,
    registration_time: String,
    status: String,
    priority: u8,
    is_emergency: bool,
    is_senior_citizen: bool,
    called_time: Option<String>,
    completion_time: Option<String>,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            token_number: row.get(1)?,
            name: row.get(2)?,
            age: row.get(3)?,
            gender: row.get(4)?,
            department: row.get(5)?,
            visit_type: row.get(6)?,
            registration_time: row.get(7)?,
            status: row.get(8)?,
            priority: row.get(9)?,
            is_emergency: row.get(10)?,
            is_senior_citizen: row.get(11)?,
            called_time: row.get(12)?,
            completion_time: row.get(13)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let priority = Priority::from_value(row.priority)
            .ok_or_else(|| DbError::Constraint(format!("Unknown priority: {}", row.priority)))?;

        Ok(Patient {
            id: row.id,
            token_number: row.token_number,
            name: row.name,
            age: row.age,
            gender: row.gender.parse().map_err(DbError::Constraint)?,
            department: row.department.parse().map_err(DbError::Constraint)?,
            visit_type: row.visit_type.parse().map_err(DbError::Constraint)?,
            registration_time: parse_timestamp(&row.registration_time)?,
            status: row.status.parse().map_err(DbError::Constraint)?,
            priority,
            is_emergency: row.is_emergency,
            is_senior_citizen: row.is_senior_citizen,
            called_time: row.called_time.as_deref().map(parse_timestamp).transpose()?,
            completion_time: row
                .completion_time
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
        })
    }
}
