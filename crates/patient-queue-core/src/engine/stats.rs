//! Daily queue statistics.

use chrono::{DateTime, Local, TimeZone, Utc};

use super::QueueEngine;
use crate::config::WaitTimeMetric;
use crate::models::{Department, Patient, QueueStats};

impl QueueEngine {
    /// Statistics for the current local calendar day.
    pub fn queue_stats(&self) -> QueueStats {
        self.queue_stats_in(&Local)
    }

    /// Statistics for the current calendar day in `tz`.
    pub fn queue_stats_in<Tz: TimeZone>(&self, tz: &Tz) -> QueueStats {
        let now = self.clock.now();
        let today = now.with_timezone(tz).date_naive();

        let todays: Vec<&Patient> = self
            .patients
            .iter()
            .filter(|p| p.registration_time.with_timezone(tz).date_naive() == today)
            .collect();
        let completed: Vec<&Patient> = todays
            .iter()
            .copied()
            .filter(|p| p.is_completed())
            .collect();

        QueueStats {
            total_patients: todays.len() as u32,
            average_wait_time: average_wait_minutes(
                &completed,
                now,
                self.config.wait_time_metric,
            ),
            busiest_department: busiest_department(&self.departments),
            total_served_today: completed.len() as u32,
        }
    }
}

/// Mean wait in whole minutes, 0 when nobody completed.
fn average_wait_minutes(completed: &[&Patient], now: DateTime<Utc>, metric: WaitTimeMetric) -> u32 {
    if completed.is_empty() {
        return 0;
    }

    let total_ms: i64 = completed
        .iter()
        .map(|p| {
            let end = match metric {
                WaitTimeMetric::SinceRegistration => now,
                WaitTimeMetric::UntilCompletion => p.completion_time.unwrap_or(now),
            };
            (end - p.registration_time).num_milliseconds()
        })
        .sum();

    let average_minutes = total_ms as f64 / completed.len() as f64 / 60_000.0;
    average_minutes.round().max(0.0) as u32
}

/// Highest served + waiting load; the earliest department wins ties.
fn busiest_department(departments: &[Department]) -> String {
    departments
        .iter()
        .fold(None::<&Department>, |best, department| match best {
            Some(best) if best.load() >= department.load() => Some(best),
            _ => Some(department),
        })
        .map(|department| department.name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueConfig;
    use crate::engine::ManualClock;
    use crate::models::{DepartmentKind, Gender, NewPatient, VisitType};
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap()
    }

    fn engine_at(clock: &ManualClock, metric: WaitTimeMetric) -> QueueEngine {
        let config = QueueConfig {
            wait_time_metric: metric,
            ..QueueConfig::default()
        };
        QueueEngine::open_with_clock(MemoryStore::new(), clock.clone(), config)
    }

    fn register(engine: &mut QueueEngine, department: DepartmentKind) -> Patient {
        engine
            .register_patient(NewPatient {
                name: "Test".into(),
                age: 35,
                gender: Gender::Male,
                department,
                visit_type: VisitType::New,
            })
            .unwrap()
    }

    #[test]
    fn test_empty_stats() {
        let clock = ManualClock::new(morning());
        let engine = engine_at(&clock, WaitTimeMetric::SinceRegistration);

        let stats = engine.queue_stats_in(&Utc);
        assert_eq!(stats.total_patients, 0);
        assert_eq!(stats.total_served_today, 0);
        assert_eq!(stats.average_wait_time, 0);
        assert_eq!(stats.busiest_department, "General");
    }

    #[test]
    fn test_average_wait_since_registration() {
        let clock = ManualClock::new(morning());
        let mut engine = engine_at(&clock, WaitTimeMetric::SinceRegistration);

        let patient = register(&mut engine, DepartmentKind::Pharmacy);
        clock.advance(Duration::minutes(10));
        engine.call_next_patient(DepartmentKind::Pharmacy).unwrap();
        engine.complete_patient(&patient.id).unwrap();

        clock.advance(Duration::minutes(20));
        let stats = engine.queue_stats_in(&Utc);
        assert_eq!(stats.total_served_today, 1);
        assert_eq!(stats.average_wait_time, 30);
    }

    #[test]
    fn test_average_wait_until_completion() {
        let clock = ManualClock::new(morning());
        let mut engine = engine_at(&clock, WaitTimeMetric::UntilCompletion);

        let patient = register(&mut engine, DepartmentKind::Pharmacy);
        clock.advance(Duration::minutes(10));
        engine.call_next_patient(DepartmentKind::Pharmacy).unwrap();
        engine.complete_patient(&patient.id).unwrap();

        clock.advance(Duration::minutes(20));
        assert_eq!(engine.queue_stats_in(&Utc).average_wait_time, 10);
    }

    #[test]
    fn test_average_wait_rounds() {
        let clock = ManualClock::new(morning());
        let mut engine = engine_at(&clock, WaitTimeMetric::UntilCompletion);

        let first = register(&mut engine, DepartmentKind::General);
        let second = register(&mut engine, DepartmentKind::Diagnostics);

        clock.advance(Duration::seconds(90));
        engine.call_next_patient(DepartmentKind::General).unwrap();
        engine.complete_patient(&first.id).unwrap();

        clock.advance(Duration::seconds(60));
        engine.call_next_patient(DepartmentKind::Diagnostics).unwrap();
        engine.complete_patient(&second.id).unwrap();

        // (1.5 + 2.5) / 2 = 2 minutes
        assert_eq!(engine.queue_stats_in(&Utc).average_wait_time, 2);
    }

    #[test]
    fn test_only_today_counts() {
        let clock = ManualClock::new(morning() - Duration::days(1));
        let mut engine = engine_at(&clock, WaitTimeMetric::SinceRegistration);
        register(&mut engine, DepartmentKind::General);

        clock.set(morning());
        register(&mut engine, DepartmentKind::General);
        register(&mut engine, DepartmentKind::Emergency);

        let stats = engine.queue_stats_in(&Utc);
        assert_eq!(stats.total_patients, 2);
        assert_eq!(stats.total_served_today, 0);
    }

    #[test]
    fn test_busiest_department() {
        let clock = ManualClock::new(morning());
        let mut engine = engine_at(&clock, WaitTimeMetric::SinceRegistration);

        register(&mut engine, DepartmentKind::Diagnostics);
        register(&mut engine, DepartmentKind::Pharmacy);
        assert_eq!(engine.queue_stats_in(&Utc).busiest_department, "Diagnostics");

        register(&mut engine, DepartmentKind::Pharmacy);
        assert_eq!(engine.queue_stats_in(&Utc).busiest_department, "Pharmacy");
    }

    #[test]
    fn test_stats_idempotent() {
        let clock = ManualClock::new(morning());
        let mut engine = engine_at(&clock, WaitTimeMetric::SinceRegistration);
        let patient = register(&mut engine, DepartmentKind::General);
        engine.call_next_patient(DepartmentKind::General).unwrap();
        engine.complete_patient(&patient.id).unwrap();

        assert_eq!(engine.queue_stats_in(&Utc), engine.queue_stats_in(&Utc));
    }
}
