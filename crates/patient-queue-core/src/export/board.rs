//! Display-board export.
//!
//! Produces the payload a waiting-room screen polls: every department with
//! its live tokens and waiting queue, plus the day's statistics.

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::engine::QueueEngine;
use crate::models::{Department, DepartmentKind, Patient, QueueStats};

/// One department as shown on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentBoard {
    #[serde(flatten)]
    pub department: Department,
    /// Waiting patients in queue order
    pub waiting_patients: Vec<Patient>,
    /// Emergency visits among the waiting
    pub emergency_count: u32,
    /// Senior citizens among the waiting, emergencies excluded
    pub senior_count: u32,
}

impl DepartmentBoard {
    fn new(department: Department, waiting_patients: Vec<Patient>) -> Self {
        let emergency_count = waiting_patients.iter().filter(|p| p.is_emergency).count() as u32;
        let senior_count = waiting_patients
            .iter()
            .filter(|p| p.is_senior_citizen && !p.is_emergency)
            .count() as u32;

        Self {
            department,
            waiting_patients,
            emergency_count,
            senior_count,
        }
    }
}

/// Full board payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayBoard {
    /// Export timestamp
    pub exported_at: String,
    pub departments: Vec<DepartmentBoard>,
    pub stats: QueueStats,
}

impl DisplayBoard {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Board exporter.
pub struct BoardExporter<'a> {
    engine: &'a QueueEngine,
}

impl<'a> BoardExporter<'a> {
    /// Create a new board exporter.
    pub fn new(engine: &'a QueueEngine) -> Self {
        Self { engine }
    }

    /// The departments section (what `GET /departments` would serve).
    pub fn departments(&self) -> Vec<DepartmentBoard> {
        DepartmentKind::ALL
            .into_iter()
            .map(|kind| {
                DepartmentBoard::new(
                    self.engine.department(kind).clone(),
                    self.engine.waiting_patients(kind),
                )
            })
            .collect()
    }

    /// Board with statistics for the local calendar day.
    pub fn export(&self) -> DisplayBoard {
        self.build(self.engine.queue_stats())
    }

    /// Board with statistics for the calendar day in `tz`.
    pub fn export_in<Tz: TimeZone>(&self, tz: &Tz) -> DisplayBoard {
        self.build(self.engine.queue_stats_in(tz))
    }

    fn build(&self, stats: QueueStats) -> DisplayBoard {
        DisplayBoard {
            exported_at: chrono::Utc::now().to_rfc3339(),
            departments: self.departments(),
            stats,
        }
    }
}
