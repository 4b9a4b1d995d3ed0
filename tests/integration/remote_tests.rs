//! Integration tests: individual remotes against the simulated GPIO.
//!
//! Exercises the lifecycle every remote shares (bind, move, close) and the
//! per-kind `input` / `output` behaviour, outside of the service.

use std::sync::Arc;

use serde_json::json;

use remotes::adapters::memory_store::MemoryStore;
use remotes::adapters::sim_gpio::SimGpio;
use remotes::adapters::time::FixedClock;
use remotes::app::ports::{DriverKind, RecordStore};
use remotes::error::Error;
use remotes::forms::FormSchema;
use remotes::record::{RemoteKind, RemoteRecord};
use remotes::remotes::{Binding, Lifecycle, Remote, RemoteDevice};

use crate::mock_hw::{alarm_form, form, pin, stored};

fn record(kind: RemoteKind, name: &str, at: i64) -> RemoteRecord {
    let data = if kind == RemoteKind::AlarmSystem {
        alarm_form(name, at, 21, 22)
    } else {
        form(name, at)
    };
    FormSchema::for_kind(kind).validate(&data).unwrap()
}

fn sim_binding() -> (Binding, SimGpio) {
    let sim = SimGpio::new();
    (Binding::enabled(Arc::new(sim.clone())), sim)
}

#[test]
fn every_kind_binds_exactly_its_own_pin() {
    for kind in RemoteKind::ALL {
        let (binding, sim) = sim_binding();
        let remote = Remote::construct(&record(kind, "x", 13), &binding).unwrap();
        assert_eq!(remote.pin(), pin(13), "{kind}");
        assert_eq!(sim.open_count(), 1, "{kind}");
        assert!(remote.binding().has_handle());
    }
}

#[test]
fn driver_kind_follows_remote_kind() {
    let (binding, _sim) = sim_binding();
    let cases = [
        (RemoteKind::SimpleOutput, DriverKind::Output),
        (RemoteKind::SimpleInput, DriverKind::Generic),
        (RemoteKind::MotionSensor, DriverKind::MotionSensor),
        (RemoteKind::Switch, DriverKind::Button),
        (RemoteKind::AlarmSystem, DriverKind::Generic),
    ];
    for (n, (kind, driver)) in cases.into_iter().enumerate() {
        let at = 4 + i64::try_from(n).unwrap();
        let remote = Remote::construct(&record(kind, "x", at), &binding).unwrap();
        assert_eq!(remote.binding().driver_kind(), driver);
    }
}

#[test]
fn close_releases_pin_and_second_close_fails() {
    let (binding, sim) = sim_binding();
    let mut remote =
        Remote::construct(&record(RemoteKind::SimpleInput, "sensor", 8), &binding).unwrap();

    remote.close().unwrap();
    assert!(!sim.is_claimed(pin(8)));
    assert_eq!(remote.binding().state(), Lifecycle::Closed);

    assert_eq!(remote.close(), Err(Error::Closed(pin(8))));
    assert_eq!(remote.change_pin(pin(9)), Err(Error::Closed(pin(8))));
}

#[test]
fn change_pin_holds_one_handle_at_a_time() {
    let (binding, sim) = sim_binding();
    let mut remote =
        Remote::construct(&record(RemoteKind::MotionSensor, "pir", 5), &binding).unwrap();

    remote.change_pin(pin(6)).unwrap();
    remote.change_pin(pin(6)).unwrap();
    remote.change_pin(pin(7)).unwrap();

    assert_eq!(remote.pin(), pin(7));
    assert_eq!(sim.open_count(), 1);
    assert!(sim.is_claimed(pin(7)));
}

#[test]
fn alarm_change_pin_moves_main_pin_only() {
    let (binding, sim) = sim_binding();
    let mut remote =
        Remote::construct(&record(RemoteKind::AlarmSystem, "house", 20), &binding).unwrap();

    remote.change_pin(pin(23)).unwrap();

    assert_eq!(remote.pin(), pin(23));
    assert!(!sim.is_claimed(pin(21)));
    assert!(!sim.is_claimed(pin(22)));
    let Remote::AlarmSystem(alarm) = &remote else {
        panic!("expected alarm");
    };
    assert_eq!(alarm.pin_buzzer(), pin(21));
    assert_eq!(alarm.pin_motion(), pin(22));
    assert_eq!(
        alarm.emails().collect::<Vec<_>>(),
        ["owner@example.com", "guard@example.com"]
    );
}

#[test]
fn input_rejects_record_of_another_kind() {
    let (binding, _sim) = sim_binding();
    let mut remote =
        Remote::construct(&record(RemoteKind::Switch, "door", 6), &binding).unwrap();

    let err = remote
        .input(&record(RemoteKind::SimpleOutput, "door", 6))
        .unwrap_err();

    assert_eq!(
        err,
        Error::KindMismatch {
            pin: pin(6),
            expected: "Switch",
            found: "SimpleOutput",
        }
    );
}

#[test]
fn output_input_applies_keep_on_to_pin_level() {
    let (binding, sim) = sim_binding();
    let off = record(RemoteKind::SimpleOutput, "lamp", 17);
    let mut remote = Remote::construct(&off, &binding).unwrap();
    assert_eq!(sim.level(pin(17)), Some(false));

    let on = FormSchema::for_kind(RemoteKind::SimpleOutput)
        .validate(&form("lamp", 17).with("keep_on", "yes"))
        .unwrap();
    remote.input(&on).unwrap();
    assert_eq!(sim.level(pin(17)), Some(true));

    remote.input(&off).unwrap();
    assert_eq!(sim.level(pin(17)), Some(false));
}

#[test]
fn switch_output_writes_state_keyed_by_pin() {
    let (binding, sim) = sim_binding();
    let rec = record(RemoteKind::Switch, "door", 6);
    let mut store = MemoryStore::new();
    store.insert(rec.to_dic()).unwrap();
    let mut remote = Remote::construct(&rec, &binding).unwrap();

    sim.set_active(pin(6), true);
    remote.output(&mut store, &FixedClock(0)).unwrap();
    assert_eq!(stored(&store, pin(6))["data"], json!("ON"));

    sim.set_active(pin(6), false);
    remote.output(&mut store, &FixedClock(0)).unwrap();
    assert_eq!(stored(&store, pin(6))["data"], json!("OFF"));

    let Remote::Switch(switch) = &remote else {
        panic!("expected switch");
    };
    assert!(switch.state().is_some());
}

#[test]
fn output_after_close_fails() {
    let (binding, _sim) = sim_binding();
    let rec = record(RemoteKind::MotionSensor, "pir", 5);
    let mut store = MemoryStore::new();
    store.insert(rec.to_dic()).unwrap();
    let mut remote = Remote::construct(&rec, &binding).unwrap();
    remote.close().unwrap();

    assert_eq!(
        remote.output(&mut store, &FixedClock(9)),
        Err(Error::Closed(pin(5)))
    );
    assert_eq!(stored(&store, pin(5))["data"], json!(null));
}

#[test]
fn debug_mode_binds_without_handles() {
    let binding = Binding::disabled();
    let mut remote =
        Remote::construct(&record(RemoteKind::SimpleOutput, "lamp", 17), &binding).unwrap();

    assert!(remote.is_bound());
    assert!(!remote.binding().has_handle());
    remote.change_pin(pin(18)).unwrap();
    assert_eq!(remote.pin(), pin(18));
    remote.close().unwrap();
    assert!(!remote.is_bound());
}
