//! Queue engine integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use patient_queue_core::models::{DepartmentKind, Gender, NewPatient, VisitType};
use patient_queue_core::store::{QueueSnapshot, SnapshotStore, StoreError, StoreResult};
use patient_queue_core::{ManualClock, MemoryStore, QueueConfig, QueueEngine, QueueError};

fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap()
}

fn patient(name: &str, age: u32, department: DepartmentKind, visit_type: VisitType) -> NewPatient {
    NewPatient {
        name: name.to_string(),
        age,
        gender: Gender::Female,
        department,
        visit_type,
    }
}

fn engine_with_clock() -> (QueueEngine, ManualClock) {
    let clock = ManualClock::new(morning());
    let engine = QueueEngine::open_with_clock(
        MemoryStore::new(),
        clock.clone(),
        QueueConfig::default(),
    );
    (engine, clock)
}

/// Store that refuses every operation.
struct BrokenStore;

impl SnapshotStore for BrokenStore {
    fn load(&mut self) -> StoreResult<Option<QueueSnapshot>> {
        Err(StoreError::Unavailable("disk offline".into()))
    }

    fn save(&mut self, _snapshot: &QueueSnapshot) -> StoreResult<()> {
        Err(StoreError::Unavailable("disk offline".into()))
    }
}

#[test]
fn test_general_department_walkthrough() {
    let (mut engine, clock) = engine_with_clock();

    let a = engine
        .register_patient(patient("A", 30, DepartmentKind::General, VisitType::New))
        .unwrap();
    clock.advance(Duration::minutes(1));
    let b = engine
        .register_patient(patient("B", 70, DepartmentKind::General, VisitType::New))
        .unwrap();
    clock.advance(Duration::minutes(1));
    let c = engine
        .register_patient(patient("C", 40, DepartmentKind::General, VisitType::Emergency))
        .unwrap();

    assert_eq!((a.token_number, a.priority.value()), (1, 1));
    assert_eq!((b.token_number, b.priority.value()), (2, 2));
    assert_eq!((c.token_number, c.priority.value()), (3, 3));
    assert!(b.is_senior_citizen);
    assert!(c.is_emergency);

    let order: Vec<String> = engine
        .waiting_patients(DepartmentKind::General)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(order, ["C", "B", "A"]);

    let called = engine
        .call_next_patient(DepartmentKind::General)
        .unwrap()
        .unwrap();
    assert_eq!(called.id, c.id);
    let general = engine.department(DepartmentKind::General);
    assert_eq!(general.current_token, Some(3));
    assert_eq!(general.next_token, Some(2));
    assert_eq!(general.waiting_count, 2);

    engine.complete_patient(&c.id).unwrap();
    let general = engine.department(DepartmentKind::General);
    assert_eq!(general.total_served, 1);
    assert_eq!(general.current_token, None);
    assert_eq!(general.waiting_count, 2);
}

#[test]
fn test_priority_classes_keep_arrival_order() {
    let (mut engine, clock) = engine_with_clock();

    // Priorities 1, 3, 2, 1, 3
    let arrivals = [
        ("r1", 25, VisitType::New),
        ("e1", 25, VisitType::Emergency),
        ("s1", 65, VisitType::FollowUp),
        ("r2", 25, VisitType::FollowUp),
        ("e2", 80, VisitType::Emergency),
    ];
    for (name, age, visit_type) in arrivals {
        engine
            .register_patient(patient(name, age, DepartmentKind::Diagnostics, visit_type))
            .unwrap();
        clock.advance(Duration::seconds(30));
    }

    let order: Vec<(String, u8)> = engine
        .waiting_patients(DepartmentKind::Diagnostics)
        .into_iter()
        .map(|p| (p.name, p.priority.value()))
        .collect();
    assert_eq!(
        order,
        [
            ("e1".to_string(), 3),
            ("e2".to_string(), 3),
            ("s1".to_string(), 2),
            ("r1".to_string(), 1),
            ("r2".to_string(), 1),
        ]
    );
}

#[test]
fn test_same_instant_falls_back_to_token() {
    let (mut engine, _clock) = engine_with_clock();
    for name in ["first", "second", "third"] {
        engine
            .register_patient(patient(name, 30, DepartmentKind::Pharmacy, VisitType::New))
            .unwrap();
    }

    let tokens: Vec<u32> = engine
        .waiting_patients(DepartmentKind::Pharmacy)
        .iter()
        .map(|p| p.token_number)
        .collect();
    assert_eq!(tokens, [1, 2, 3]);
}

#[test]
fn test_call_next_on_empty_queue() {
    let (mut engine, _clock) = engine_with_clock();
    engine
        .register_patient(patient("A", 30, DepartmentKind::General, VisitType::New))
        .unwrap();
    let before = engine.snapshot();

    let called = engine.call_next_patient(DepartmentKind::Pharmacy).unwrap();

    assert!(called.is_none());
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_complete_unknown_patient() {
    let (mut engine, _clock) = engine_with_clock();
    engine
        .register_patient(patient("A", 30, DepartmentKind::General, VisitType::New))
        .unwrap();
    engine.call_next_patient(DepartmentKind::General).unwrap();
    let before = engine.snapshot();

    let err = engine.complete_patient("no-such-id").unwrap_err();

    assert!(matches!(err, QueueError::NotFound(ref id) if id == "no-such-id"));
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_call_next_takes_exactly_the_head() {
    let (mut engine, clock) = engine_with_clock();
    for (age, visit_type) in [(30, VisitType::New), (75, VisitType::New), (30, VisitType::New)] {
        engine
            .register_patient(patient("P", age, DepartmentKind::Emergency, visit_type))
            .unwrap();
        clock.advance(Duration::seconds(10));
    }

    let waiting_before = engine.waiting_patients(DepartmentKind::Emergency);
    let count_before = engine.department(DepartmentKind::Emergency).waiting_count;

    let called = engine
        .call_next_patient(DepartmentKind::Emergency)
        .unwrap()
        .unwrap();
    let waiting_after = engine.waiting_patients(DepartmentKind::Emergency);

    assert_eq!(called.id, waiting_before[0].id);
    assert_eq!(waiting_after.as_slice(), &waiting_before[1..]);
    assert_eq!(
        engine.department(DepartmentKind::Emergency).current_token,
        Some(called.token_number)
    );
    assert_eq!(
        engine.department(DepartmentKind::Emergency).waiting_count,
        count_before - 1
    );
}

#[test]
fn test_departments_are_independent() {
    let (mut engine, _clock) = engine_with_clock();
    engine
        .register_patient(patient("G", 30, DepartmentKind::General, VisitType::New))
        .unwrap();
    let p = engine
        .register_patient(patient("P", 30, DepartmentKind::Pharmacy, VisitType::New))
        .unwrap();
    assert_eq!(p.token_number, 1);

    engine.call_next_patient(DepartmentKind::General).unwrap();
    let called = engine
        .call_next_patient(DepartmentKind::Pharmacy)
        .unwrap()
        .unwrap();
    assert_eq!(called.id, p.id);
    assert_eq!(engine.in_progress_patients().len(), 2);
}

#[test]
fn test_stats_for_the_day() {
    let (mut engine, clock) = engine_with_clock();
    let a = engine
        .register_patient(patient("A", 30, DepartmentKind::General, VisitType::New))
        .unwrap();
    engine
        .register_patient(patient("B", 30, DepartmentKind::Diagnostics, VisitType::New))
        .unwrap();
    engine
        .register_patient(patient("C", 30, DepartmentKind::Diagnostics, VisitType::New))
        .unwrap();

    clock.advance(Duration::minutes(10));
    engine.call_next_patient(DepartmentKind::General).unwrap();
    engine.complete_patient(&a.id).unwrap();
    clock.advance(Duration::minutes(10));

    let stats = engine.queue_stats_in(&Utc);
    assert_eq!(stats.total_patients, 3);
    assert_eq!(stats.total_served_today, 1);
    assert_eq!(stats.average_wait_time, 20);
    assert_eq!(stats.busiest_department, "Diagnostics");

    // No mutation, frozen clock
    assert_eq!(engine.queue_stats_in(&Utc), stats);

    // Next day: yesterday's registrations drop out
    clock.advance(Duration::days(1));
    let stats = engine.queue_stats_in(&Utc);
    assert_eq!(stats.total_patients, 0);
    assert_eq!(stats.total_served_today, 0);
    assert_eq!(stats.average_wait_time, 0);
}

#[test]
fn test_failed_saves_keep_memory_state() {
    let clock = ManualClock::new(morning());
    let mut engine = QueueEngine::open_with_clock(BrokenStore, clock, QueueConfig::default());

    // Load failure falls back to the idle departments
    assert_eq!(engine.department_listing().len(), 4);
    assert!(engine.patients().is_empty());

    let registered = engine
        .register_patient(patient("A", 30, DepartmentKind::General, VisitType::New))
        .unwrap();
    engine.call_next_patient(DepartmentKind::General).unwrap();

    assert_eq!(engine.failed_saves(), 2);
    assert!(engine.patient(&registered.id).unwrap().is_in_progress());
    assert_eq!(
        engine.department(DepartmentKind::General).current_token,
        Some(1)
    );
}

#[test]
fn test_snapshot_reaches_store_after_each_mutation() {
    let store = MemoryStore::new();
    let mut engine = QueueEngine::open(store.clone(), QueueConfig::default());
    assert!(store.snapshot().is_none());

    engine
        .register_patient(patient("A", 30, DepartmentKind::General, VisitType::New))
        .unwrap();
    assert_eq!(store.snapshot().unwrap(), engine.snapshot());

    engine.call_next_patient(DepartmentKind::General).unwrap();
    assert_eq!(store.snapshot().unwrap(), engine.snapshot());
}
