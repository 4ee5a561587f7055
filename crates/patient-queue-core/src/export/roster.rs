//! Daily registration roster export.

use chrono::{Local, SecondsFormat, TimeZone};
use serde::{Deserialize, Serialize};

use crate::engine::QueueEngine;
use crate::models::Patient;

/// One registration on the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub token_number: u32,
    pub name: String,
    pub department: String,
    pub visit_type: String,
    pub priority: u8,
    pub status: String,
    pub registration_time: String,
}

impl From<&Patient> for RosterEntry {
    fn from(patient: &Patient) -> Self {
        Self {
            token_number: patient.token_number,
            name: patient.name.clone(),
            department: patient.department.name().to_string(),
            visit_type: patient.visit_type.as_str().to_string(),
            priority: patient.priority.value(),
            status: patient.status.as_str().to_string(),
            registration_time: patient
                .registration_time
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// The day's registrations, in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    /// Export timestamp
    pub exported_at: String,
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("token_number,name,department,visit_type,priority,status,registration_time\n");

        for entry in &self.entries {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                entry.token_number,
                escape_csv(&entry.name),
                escape_csv(&entry.department),
                escape_csv(&entry.visit_type),
                entry.priority,
                escape_csv(&entry.status),
                escape_csv(&entry.registration_time),
            ));
        }

        csv
    }
}

/// Roster exporter.
pub struct RosterExporter<'a> {
    engine: &'a QueueEngine,
}

impl<'a> RosterExporter<'a> {
    /// Create a new roster exporter.
    pub fn new(engine: &'a QueueEngine) -> Self {
        Self { engine }
    }

    /// Today's registrations, local calendar day.
    pub fn export_today(&self) -> Roster {
        self.export_today_in(&Local)
    }

    /// Today's registrations in `tz`, by the engine clock.
    pub fn export_today_in<Tz: TimeZone>(&self, tz: &Tz) -> Roster {
        let now = self.engine.now();
        let today = now.with_timezone(tz).date_naive();

        let entries = self
            .engine
            .patients()
            .iter()
            .filter(|p| p.registration_time.with_timezone(tz).date_naive() == today)
            .map(RosterEntry::from)
            .collect();

        Roster {
            exported_at: now.to_rfc3339(),
            entries,
        }
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
