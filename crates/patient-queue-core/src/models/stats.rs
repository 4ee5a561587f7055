//! Derived queue views.

use serde::{Deserialize, Serialize};

/// Aggregate statistics for the current day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueStats {
    /// Patients registered today
    pub total_patients: u32,
    /// Average wait of today's completed patients, whole minutes
    pub average_wait_time: u32,
    /// Department with the largest served + waiting load
    pub busiest_department: String,
    /// Today's patients that have completed service
    pub total_served_today: u32,
}

/// Where a patient stands in their department's queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueuePosition {
    pub patient_id: String,
    pub token_number: u32,
    /// 1-based place in the waiting queue, 0 when not waiting
    pub position: u32,
    /// `position` times the configured per-patient service estimate
    pub estimated_wait_minutes: u32,
}
