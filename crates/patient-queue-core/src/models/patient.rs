//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::department::DepartmentKind;

/// Age from which a patient counts as a senior citizen.
pub const SENIOR_CITIZEN_AGE: u32 = 60;

/// Accepted age range for registration.
pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;

/// Patient gender as captured at the registration desk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("unknown gender: {}", s)),
        }
    }
}

/// Reason for the visit. Emergency visits jump the queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VisitType {
    New,
    #[serde(rename = "Follow-up")]
    FollowUp,
    Emergency,
}

impl VisitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitType::New => "New",
            VisitType::FollowUp => "Follow-up",
            VisitType::Emergency => "Emergency",
        }
    }
}

impl FromStr for VisitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(VisitType::New),
            "follow-up" | "followup" | "follow_up" => Ok(VisitType::FollowUp),
            "emergency" => Ok(VisitType::Emergency),
            _ => Err(format!("unknown visit type: {}", s)),
        }
    }
}

/// Lifecycle of a patient's service request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatientStatus {
    /// Registered, waiting to be called
    Waiting,
    /// Called and currently being served
    #[serde(rename = "In Progress")]
    InProgress,
    /// Service finished (terminal)
    Completed,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Waiting => "Waiting",
            PatientStatus::InProgress => "In Progress",
            PatientStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Waiting" => Ok(PatientStatus::Waiting),
            "In Progress" => Ok(PatientStatus::InProgress),
            "Completed" => Ok(PatientStatus::Completed),
            _ => Err(format!("unknown patient status: {}", s)),
        }
    }
}

/// Queue precedence class. Higher values are served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Regular = 1,
    Senior = 2,
    Emergency = 3,
}

impl Priority {
    /// Derive the priority class from the registration facts.
    pub fn classify(is_emergency: bool, is_senior_citizen: bool) -> Self {
        if is_emergency {
            Priority::Emergency
        } else if is_senior_citizen {
            Priority::Senior
        } else {
            Priority::Regular
        }
    }

    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Priority::Regular),
            2 => Some(Priority::Senior),
            3 => Some(Priority::Emergency),
            _ => None,
        }
    }
}

// Stored and exported as the bare integer (1, 2, 3).
impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Priority::from_value(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid priority: {}", value)))
    }
}

/// Validated registration data, the input of `QueueEngine::register_patient`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub department: DepartmentKind,
    pub visit_type: VisitType,
}

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Opaque UUID, assigned at registration
    pub id: String,
    /// Sequential token within the department, starting at 1
    pub token_number: u32,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub department: DepartmentKind,
    pub visit_type: VisitType,
    pub registration_time: DateTime<Utc>,
    pub status: PatientStatus,
    /// Fixed at registration, never recomputed
    pub priority: Priority,
    pub is_emergency: bool,
    pub is_senior_citizen: bool,
    /// When the patient was called for service
    #[serde(default)]
    pub called_time: Option<DateTime<Utc>>,
    /// When service was completed
    #[serde(default)]
    pub completion_time: Option<DateTime<Utc>>,
}

impl Patient {
    /// Create a waiting patient with the given token and registration time.
    pub fn new(data: NewPatient, token_number: u32, registration_time: DateTime<Utc>) -> Self {
        let is_emergency = data.visit_type == VisitType::Emergency;
        let is_senior_citizen = data.age >= SENIOR_CITIZEN_AGE;

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            token_number,
            name: data.name,
            age: data.age,
            gender: data.gender,
            department: data.department,
            visit_type: data.visit_type,
            registration_time,
            status: PatientStatus::Waiting,
            priority: Priority::classify(is_emergency, is_senior_citizen),
            is_emergency,
            is_senior_citizen,
            called_time: None,
            completion_time: None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == PatientStatus::Waiting
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == PatientStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == PatientStatus::Completed
    }
}
