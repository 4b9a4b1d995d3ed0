//! Integration tests: `RemoteService` with simulated GPIO and mock stores.
//!
//! Covers the create / update / remove / poll / load flows end to end,
//! including pin conflicts, store failures and debug mode.

use std::sync::Arc;

use serde_json::json;

use remotes::adapters::json_store::JsonFileStore;
use remotes::adapters::memory_store::MemoryStore;
use remotes::adapters::sim_gpio::SimGpio;
use remotes::adapters::time::FixedClock;
use remotes::app::commands::RemoteCommand;
use remotes::app::events::RemoteEvent;
use remotes::app::ports::{DriverError, Matcher, RecordStore};
use remotes::app::service::RemoteService;
use remotes::error::Error;
use remotes::forms::FormData;
use remotes::record::RemoteKind;
use remotes::remotes::{Binding, RemoteDevice};

use crate::mock_hw::{alarm_form, form, pin, stored, FlakyStore, RecordingSink};

fn hw_service() -> (RemoteService, SimGpio) {
    let sim = SimGpio::new();
    let svc = RemoteService::new(Binding::enabled(Arc::new(sim.clone())));
    (svc, sim)
}

fn create(
    svc: &mut RemoteService,
    kind: RemoteKind,
    form: FormData,
    store: &mut impl RecordStore,
    sink: &mut RecordingSink,
) -> Result<(), Error> {
    svc.handle_command(RemoteCommand::Create { kind, form }, store, sink)
}

fn update(
    svc: &mut RemoteService,
    at: i64,
    form: FormData,
    store: &mut impl RecordStore,
    sink: &mut RecordingSink,
) -> Result<(), Error> {
    svc.handle_command(RemoteCommand::Update { pin: pin(at), form }, store, sink)
}

// ── Create ────────────────────────────────────────────────────

#[test]
fn create_output_binds_pin_and_stores_record() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();

    create(
        &mut svc,
        RemoteKind::SimpleOutput,
        form("lamp", 17).with("keep_on", "y"),
        &mut store,
        &mut sink,
    )
    .unwrap();

    assert!(sim.is_claimed(pin(17)));
    assert_eq!(sim.level(pin(17)), Some(true));
    assert_eq!(
        serde_json::Value::Object(stored(&store, pin(17))),
        json!({"pin": 17, "name": "lamp", "type": "SimpleOutput", "keep_on": true})
    );
    assert_eq!(
        sink.last(),
        Some(&RemoteEvent::Created { pin: pin(17), kind: RemoteKind::SimpleOutput })
    );
}

#[test]
fn create_on_configured_pin_is_rejected() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();

    create(&mut svc, RemoteKind::Switch, form("door", 6), &mut store, &mut sink).unwrap();
    let err = create(&mut svc, RemoteKind::SimpleInput, form("other", 6), &mut store, &mut sink)
        .unwrap_err();

    assert_eq!(err, Error::DuplicatePin(pin(6)));
    assert_eq!(store.len(), 1);
    assert_eq!(sim.open_count(), 1);
}

#[test]
fn create_on_pin_held_elsewhere_stores_nothing() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    sim.inject_fault(pin(12), DriverError::PinInUse(12));

    let err = create(&mut svc, RemoteKind::SimpleOutput, form("fan", 12), &mut store, &mut sink)
        .unwrap_err();

    assert_eq!(err, Error::PinUnavailable(pin(12)));
    assert!(store.is_empty());
    assert!(svc.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn other_driver_failures_pass_through() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    sim.inject_fault(pin(12), DriverError::PermissionDenied("/dev/gpiomem".into()));

    let err = create(&mut svc, RemoteKind::SimpleInput, form("sensor", 12), &mut store, &mut sink)
        .unwrap_err();

    assert_eq!(
        err,
        Error::Driver(DriverError::PermissionDenied("/dev/gpiomem".into()))
    );
}

#[test]
fn create_releases_pin_when_store_fails() {
    let (mut svc, sim) = hw_service();
    let mut store = FlakyStore::new();
    store.fail_writes = true;
    let mut sink = RecordingSink::new();

    let err = create(&mut svc, RemoteKind::SimpleOutput, form("fan", 12), &mut store, &mut sink)
        .unwrap_err();

    assert!(matches!(err, Error::Store(_)));
    assert!(!sim.is_claimed(pin(12)));
    assert!(svc.is_empty());
}

#[test]
fn failed_file_write_leaves_pin_free_for_retry() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state");
    let path = state.join("remotes.json");
    let mut store = JsonFileStore::open(&path).unwrap();
    let (mut svc, sim) = hw_service();
    let mut sink = RecordingSink::new();

    let err = create(&mut svc, RemoteKind::SimpleOutput, form("lamp", 12), &mut store, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(store.all().unwrap().is_empty());
    assert!(!sim.is_claimed(pin(12)));

    std::fs::create_dir(&state).unwrap();
    create(&mut svc, RemoteKind::SimpleOutput, form("lamp", 12), &mut store, &mut sink).unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.all().unwrap().len(), 1);
    assert_eq!(stored(&reopened, pin(12))["name"], json!("lamp"));
}

#[test]
fn invalid_form_reports_every_bad_field() {
    let (mut svc, _sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    let bad = FormData::new()
        .with("name", " ")
        .with("pin", "3")
        .with("pin_buzzer", "")
        .with("pin_motion", "27")
        .with("emails", "nobody");

    let Err(Error::Form(errors)) =
        create(&mut svc, RemoteKind::AlarmSystem, bad, &mut store, &mut sink)
    else {
        panic!("expected form errors");
    };

    let fields: Vec<&str> = errors.fields().collect();
    assert_eq!(fields, ["emails", "name", "pin", "pin_buzzer", "pin_motion"]);
    assert!(store.is_empty());
}

// ── Update ────────────────────────────────────────────────────

#[test]
fn update_moves_remote_to_new_pin() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    create(&mut svc, RemoteKind::SimpleOutput, form("lamp", 17), &mut store, &mut sink).unwrap();

    update(
        &mut svc,
        17,
        form("porch lamp", 22).with("keep_on", "on"),
        &mut store,
        &mut sink,
    )
    .unwrap();

    assert!(!sim.is_claimed(pin(17)));
    assert!(sim.is_claimed(pin(22)));
    assert_eq!(sim.level(pin(22)), Some(true));
    assert_eq!(sim.open_count(), 1);

    assert!(svc.get(pin(17)).is_none());
    let remote = svc.get(pin(22)).unwrap();
    assert_eq!(remote.name(), "porch lamp");

    assert!(store.find(&Matcher::pin(pin(17))).unwrap().is_none());
    assert_eq!(stored(&store, pin(22))["name"], json!("porch lamp"));
    assert!(sink.contains(&RemoteEvent::PinChanged { from: pin(17), to: pin(22) }));
    assert_eq!(sink.last(), Some(&RemoteEvent::Updated { pin: pin(22) }));
}

#[test]
fn update_onto_another_remote_is_rejected() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    create(&mut svc, RemoteKind::SimpleOutput, form("a", 5), &mut store, &mut sink).unwrap();
    create(&mut svc, RemoteKind::SimpleOutput, form("b", 6), &mut store, &mut sink).unwrap();

    let err = update(&mut svc, 5, form("a", 6), &mut store, &mut sink).unwrap_err();

    assert_eq!(err, Error::DuplicatePin(pin(6)));
    assert!(sim.is_claimed(pin(5)));
    assert!(svc.get(pin(5)).unwrap().is_bound());
}

#[test]
fn update_onto_stored_but_unloaded_pin_is_rejected() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::with_docs(vec![
        json!({"pin": 5, "name": "lamp", "type": "SimpleOutput", "keep_on": false})
            .as_object()
            .unwrap()
            .clone(),
        json!({"pin": 6, "name": "mystery", "type": "Toaster"})
            .as_object()
            .unwrap()
            .clone(),
    ]);
    let mut sink = RecordingSink::new();
    let report = svc.load(&store, &mut sink).unwrap();
    assert_eq!(report.bound, vec![pin(5)]);

    let err = update(&mut svc, 5, form("lamp", 6), &mut store, &mut sink).unwrap_err();

    assert_eq!(err, Error::DuplicatePin(pin(6)));
    assert!(sim.is_claimed(pin(5)));
    assert!(!sim.is_claimed(pin(6)));
    let on_six = store
        .all()
        .unwrap()
        .into_iter()
        .filter(|d| Matcher::pin(pin(6)).matches(d))
        .count();
    assert_eq!(on_six, 1);
    assert_eq!(stored(&store, pin(5))["name"], json!("lamp"));
}

#[test]
fn failed_move_leaves_remote_closed_until_next_edit() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    create(&mut svc, RemoteKind::Switch, form("door", 9), &mut store, &mut sink).unwrap();
    sim.inject_fault(pin(10), DriverError::PinInUse(10));

    let err = update(&mut svc, 9, form("door", 10), &mut store, &mut sink).unwrap_err();
    assert_eq!(err, Error::PinUnavailable(pin(10)));

    let remote = svc.get(pin(9)).unwrap();
    assert!(!remote.is_bound());
    assert_eq!(sim.open_count(), 0);

    // Output on a closed remote fails and is counted.
    let report = svc.poll(&mut store, &FixedClock(0), &mut sink);
    assert_eq!(report.failed, 1);

    // Editing it again rebinds it.
    update(&mut svc, 9, form("door", 9), &mut store, &mut sink).unwrap();
    assert!(svc.get(pin(9)).unwrap().is_bound());
    assert!(sim.is_claimed(pin(9)));
}

#[test]
fn update_keeps_stored_reading() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    create(&mut svc, RemoteKind::MotionSensor, form("hall", 4), &mut store, &mut sink).unwrap();
    sim.set_active(pin(4), true);
    svc.poll(&mut store, &FixedClock(1_700_000_000), &mut sink);

    update(&mut svc, 4, form("hallway", 4), &mut store, &mut sink).unwrap();

    let doc = stored(&store, pin(4));
    assert_eq!(doc["name"], json!("hallway"));
    assert_eq!(doc["data"], json!(1_700_000_000));
}

#[test]
fn rebinding_a_closed_sensor_keeps_its_reading() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    create(&mut svc, RemoteKind::MotionSensor, form("hall", 4), &mut store, &mut sink).unwrap();
    sim.set_active(pin(4), true);
    svc.poll(&mut store, &FixedClock(500), &mut sink);
    sim.set_active(pin(4), false);

    sim.inject_fault(pin(7), DriverError::PinInUse(7));
    update(&mut svc, 4, form("hall", 7), &mut store, &mut sink).unwrap_err();
    update(&mut svc, 4, form("hall", 4), &mut store, &mut sink).unwrap();

    svc.poll(&mut store, &FixedClock(900), &mut sink);
    assert_eq!(stored(&store, pin(4))["data"], json!(500));
}

#[test]
fn update_store_failure_keeps_remote_registered() {
    let (mut svc, _sim) = hw_service();
    let mut store = FlakyStore::new();
    let mut sink = RecordingSink::new();
    create(&mut svc, RemoteKind::SimpleOutput, form("lamp", 17), &mut store, &mut sink).unwrap();
    store.fail_writes = true;

    let err = update(&mut svc, 17, form("lamp", 18), &mut store, &mut sink).unwrap_err();

    assert!(matches!(err, Error::Store(_)));
    assert!(svc.get(pin(18)).is_some());
    assert_eq!(svc.len(), 1);
}

// ── Remove ────────────────────────────────────────────────────

#[test]
fn remove_closes_pin_and_deletes_record() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    create(&mut svc, RemoteKind::SimpleInput, form("sensor", 8), &mut store, &mut sink).unwrap();

    svc.handle_command(RemoteCommand::Remove { pin: pin(8) }, &mut store, &mut sink)
        .unwrap();

    assert!(!sim.is_claimed(pin(8)));
    assert!(store.is_empty());
    assert!(svc.is_empty());
    assert_eq!(sink.last(), Some(&RemoteEvent::Removed { pin: pin(8) }));

    let err = svc
        .handle_command(RemoteCommand::Remove { pin: pin(8) }, &mut store, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::UnknownRemote(pin(8)));
}

// ── Poll ──────────────────────────────────────────────────────

#[test]
fn poll_writes_sensor_readings() {
    let (mut svc, sim) = hw_service();
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    create(&mut svc, RemoteKind::MotionSensor, form("pir", 5), &mut store, &mut sink).unwrap();
    create(&mut svc, RemoteKind::Switch, form("door", 6), &mut store, &mut sink).unwrap();
    create(&mut svc, RemoteKind::SimpleOutput, form("lamp", 7), &mut store, &mut sink).unwrap();

    let report = svc.poll(&mut store, &FixedClock(100), &mut sink);
    assert_eq!(report.written, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(stored(&store, pin(5))["data"], json!(null));
    assert_eq!(stored(&store, pin(6))["data"], json!("OFF"));

    sim.set_active(pin(5), true);
    sim.set_active(pin(6), true);
    svc.poll(&mut store, &FixedClock(200), &mut sink);
    assert_eq!(stored(&store, pin(5))["data"], json!(200));
    assert_eq!(stored(&store, pin(6))["data"], json!("ON"));

    // Motion timestamp sticks once the sensor goes quiet.
    sim.set_active(pin(5), false);
    svc.poll(&mut store, &FixedClock(300), &mut sink);
    assert_eq!(stored(&store, pin(5))["data"], json!(200));
    assert_eq!(
        sink.last(),
        Some(&RemoteEvent::Polled { written: 3, failed: 0 })
    );
}

// ── Load / shutdown ───────────────────────────────────────────

#[test]
fn load_rebuilds_remotes_from_file_and_skips_bad_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remotes.json");
    std::fs::write(
        &path,
        json!([
            {"pin": 17, "name": "lamp", "type": "SimpleOutput", "keep_on": true},
            {"pin": 5, "name": "pir", "type": "MotionSensor", "data": 42},
            {"pin": 30, "name": "bad pin", "type": "Switch", "data": null},
            {"pin": 6, "name": "mystery", "type": "Toaster"},
            {"pin": 20, "name": "alarm", "type": "AlarmSystem", "keep_on": false,
             "pin_buzzer": 21, "pin_motion": 22, "motion": null,
             "photo_toggle": false, "emails": "a@b.com"}
        ])
        .to_string(),
    )
    .unwrap();
    let store = JsonFileStore::open(&path).unwrap();
    let (mut svc, sim) = hw_service();
    let mut sink = RecordingSink::new();

    let report = svc.load(&store, &mut sink).unwrap();

    assert_eq!(report.bound, vec![pin(17), pin(5), pin(20)]);
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed.iter().all(|e| matches!(e, Error::Record(_))));
    assert_eq!(sim.level(pin(17)), Some(true));
    assert_eq!(sim.open_count(), 3);
    assert_eq!(sink.last(), Some(&RemoteEvent::Loaded { bound: 3, failed: 2 }));

    svc.shutdown(&mut sink);
    assert_eq!(sim.open_count(), 0);
    assert!(svc.is_empty());
    assert!(sink.contains(&RemoteEvent::Closed { pin: pin(20) }));
}

#[test]
fn restart_keeps_stored_motion_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remotes.json");
    std::fs::write(
        &path,
        json!([{"pin": 5, "name": "pir", "type": "MotionSensor", "data": 1_700_000_000}])
            .to_string(),
    )
    .unwrap();
    let mut store = JsonFileStore::open(&path).unwrap();
    let (mut svc, _sim) = hw_service();
    let mut sink = RecordingSink::new();
    svc.load(&store, &mut sink).unwrap();

    let report = svc.poll(&mut store, &FixedClock(1_800_000_000), &mut sink);

    assert_eq!(report.written, 1);
    assert_eq!(stored(&store, pin(5))["data"], json!(1_700_000_000));
    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(stored(&reopened, pin(5))["data"], json!(1_700_000_000));
}

#[test]
fn alarm_round_trips_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remotes.json");
    let mut sink = RecordingSink::new();
    {
        let mut store = JsonFileStore::open(&path).unwrap();
        let (mut svc, _sim) = hw_service();
        create(
            &mut svc,
            RemoteKind::AlarmSystem,
            alarm_form("house", 20, 21, 22),
            &mut store,
            &mut sink,
        )
        .unwrap();
        svc.shutdown(&mut sink);
    }

    let store = JsonFileStore::open(&path).unwrap();
    let doc = stored(&store, pin(20));
    assert_eq!(doc["emails"], json!("owner@example.com,guard@example.com"));
    assert_eq!(doc["photo_toggle"], json!(false));

    let (mut svc, _sim) = hw_service();
    let report = svc.load(&store, &mut sink).unwrap();
    assert_eq!(report.bound, vec![pin(20)]);
    assert_eq!(svc.get(pin(20)).unwrap().kind(), RemoteKind::AlarmSystem);
}

// ── Debug mode ────────────────────────────────────────────────

#[test]
fn debug_mode_runs_without_gpio() {
    let mut svc = RemoteService::new(Binding::disabled());
    let mut store = MemoryStore::new();
    let mut sink = RecordingSink::new();
    assert!(!svc.hardware_enabled());

    create(
        &mut svc,
        RemoteKind::SimpleOutput,
        form("lamp", 17).with("keep_on", "y"),
        &mut store,
        &mut sink,
    )
    .unwrap();
    create(&mut svc, RemoteKind::Switch, form("door", 6), &mut store, &mut sink).unwrap();

    let report = svc.poll(&mut store, &FixedClock(1), &mut sink);
    assert_eq!(report.written, 2);
    assert_eq!(stored(&store, pin(6))["data"], json!("OFF"));

    update(&mut svc, 17, form("lamp", 18), &mut store, &mut sink).unwrap();
    assert_eq!(svc.pins().collect::<Vec<_>>(), vec![pin(6), pin(18)]);
}
