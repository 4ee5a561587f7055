//! Engine configuration.

use serde::{Deserialize, Serialize};

/// How `average_wait_time` is measured for completed patients.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WaitTimeMetric {
    /// `now - registration_time`, the historical dashboard figure
    #[default]
    SinceRegistration,
    /// `completion_time - registration_time`
    UntilCompletion,
}

/// Tunables for the queue engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueueConfig {
    /// Fixed per-patient service estimate used for queue position waits
    pub estimated_service_minutes: u32,
    pub wait_time_metric: WaitTimeMetric,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            estimated_service_minutes: 15,
            wait_time_metric: WaitTimeMetric::default(),
        }
    }
}
