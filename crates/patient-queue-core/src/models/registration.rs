//! Registration input and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::department::DepartmentKind;
use super::patient::{Gender, NewPatient, VisitType, MAX_AGE, MIN_AGE};

/// Malformed registration input. Names the offending field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn missing(field: &'static str) -> Self {
        Self::new(field, "required field is missing")
    }
}

/// Raw, untyped registration form as submitted by a front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegistrationForm {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub visit_type: Option<String>,
}

impl RegistrationForm {
    /// Check every field and convert to a typed `NewPatient`.
    pub fn validate(&self) -> Result<NewPatient, ValidationError> {
        let name = required_text(&self.name, "name")?;

        let age = self.age.ok_or_else(|| ValidationError::missing("age"))?;
        let age = u32::try_from(age)
            .ok()
            .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
            .ok_or_else(|| {
                ValidationError::new(
                    "age",
                    format!("{} is outside {}..={}", age, MIN_AGE, MAX_AGE),
                )
            })?;

        let gender: Gender = required_text(&self.gender, "gender")?
            .parse()
            .map_err(|e: String| ValidationError::new("gender", e))?;
        let department: DepartmentKind = required_text(&self.department, "department")?
            .parse()
            .map_err(|e: String| ValidationError::new("department", e))?;
        let visit_type: VisitType = required_text(&self.visit_type, "visit_type")?
            .parse()
            .map_err(|e: String| ValidationError::new("visit_type", e))?;

        let patient = NewPatient {
            name,
            age,
            gender,
            department,
            visit_type,
        };
        validate_new_patient(&patient)?;
        Ok(patient)
    }
}

/// Checks the engine applies to typed input as well.
pub fn validate_new_patient(patient: &NewPatient) -> Result<(), ValidationError> {
    if patient.name.trim().is_empty() {
        return Err(ValidationError::missing("name"));
    }
    if !(MIN_AGE..=MAX_AGE).contains(&patient.age) {
        return Err(ValidationError::new(
            "age",
            format!("{} is outside {}..={}", patient.age, MIN_AGE, MAX_AGE),
        ));
    }
    Ok(())
}

fn required_text(value: &Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError::missing(field)),
    }
}
