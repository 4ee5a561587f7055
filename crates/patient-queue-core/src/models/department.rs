//! Department models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of hospital departments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DepartmentKind {
    General,
    Diagnostics,
    Emergency,
    Pharmacy,
}

impl DepartmentKind {
    /// All departments, in display (and tie-break) order.
    pub const ALL: [DepartmentKind; 4] = [
        DepartmentKind::General,
        DepartmentKind::Diagnostics,
        DepartmentKind::Emergency,
        DepartmentKind::Pharmacy,
    ];

    /// Lower-case slug used as the department id.
    pub fn id(&self) -> &'static str {
        match self {
            DepartmentKind::General => "general",
            DepartmentKind::Diagnostics => "diagnostics",
            DepartmentKind::Emergency => "emergency",
            DepartmentKind::Pharmacy => "pharmacy",
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            DepartmentKind::General => "General",
            DepartmentKind::Diagnostics => "Diagnostics",
            DepartmentKind::Emergency => "Emergency",
            DepartmentKind::Pharmacy => "Pharmacy",
        }
    }

    /// Position in `ALL`.
    pub fn position(&self) -> usize {
        match self {
            DepartmentKind::General => 0,
            DepartmentKind::Diagnostics => 1,
            DepartmentKind::Emergency => 2,
            DepartmentKind::Pharmacy => 3,
        }
    }
}

impl fmt::Display for DepartmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either the display name or the id, case-insensitively.
impl FromStr for DepartmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DepartmentKind::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| format!("unknown department: {}", s))
    }
}

/// Live service state of a department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub id: String,
    pub name: String,
    /// Token currently being served
    pub current_token: Option<u32>,
    /// Token at the head of the waiting queue
    pub next_token: Option<u32>,
    /// Completed services, never reset within a session
    pub total_served: u32,
    /// Patients currently waiting
    pub waiting_count: u32,
}

impl Department {
    /// Create an idle department with zero counts.
    pub fn new(kind: DepartmentKind) -> Self {
        Self {
            id: kind.id().to_string(),
            name: kind.name().to_string(),
            current_token: None,
            next_token: None,
            total_served: 0,
            waiting_count: 0,
        }
    }

    /// The four departments in their default, idle state.
    pub fn defaults() -> Vec<Self> {
        DepartmentKind::ALL.into_iter().map(Self::new).collect()
    }

    /// Resolve the department kind from the stored name.
    pub fn kind(&self) -> Option<DepartmentKind> {
        self.name.parse().ok()
    }

    /// Served plus waiting, the load used to pick the busiest department.
    pub fn load(&self) -> u32 {
        self.total_served + self.waiting_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let departments = Department::defaults();
        assert_eq!(departments.len(), 4);
        assert_eq!(departments[0].id, "general");
        assert_eq!(departments[3].name, "Pharmacy");
        assert!(departments.iter().all(|d| d.load() == 0 && d.current_token.is_none()));
    }

    #[test]
    fn test_parse_department() {
        assert_eq!("General".parse::<DepartmentKind>().unwrap(), DepartmentKind::General);
        assert_eq!("pharmacy".parse::<DepartmentKind>().unwrap(), DepartmentKind::Pharmacy);
        assert!("Cardiology".parse::<DepartmentKind>().is_err());
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in DepartmentKind::ALL {
            assert_eq!(Department::new(kind).kind(), Some(kind));
            assert_eq!(DepartmentKind::ALL[kind.position()], kind);
        }
    }
}
