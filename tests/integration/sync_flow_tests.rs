//! Store synchronisation flows across several loop cycles.

use terraflow::app::state::{DeviceState, Mode, PumpState};
use terraflow::config::SystemConfig;
use terraflow::sync::commands::CommandSync;
use terraflow::sync::paths;
use terraflow::sync::telemetry::TelemetrySync;

use super::mock_hw::MockStore;

fn setup() -> (SystemConfig, DeviceState, MockStore) {
    let config = SystemConfig::default();
    let state = DeviceState::new(&config);
    (config, state, MockStore::new())
}

#[test]
fn distance_reporting_follows_deadband_across_cycles() {
    let (config, mut state, mut store) = setup();
    let mut sync = TelemetrySync::new(&config);

    for (t, cm) in [(0, 12.0), (2_500, 12.3), (5_000, 12.5), (7_500, 12.6), (10_000, 12.2)] {
        state.distance = Some(cm);
        sync.report(&mut state, t, &mut store);
    }

    // 12.3 and 12.5 sit inside the band around 12.0; 12.6 leaves it;
    // 12.2 is back within 0.5 of 12.6.
    assert_eq!(store.writes_to(paths::DISTANCE), vec!["12.0", "12.6"]);
    assert_eq!(state.last_reported.distance, Some(12.6));
    assert_eq!(store.writes_to(paths::DEVICE_TIMESTAMP).len(), 5);
}

#[test]
fn failed_reading_is_retried_next_cycle() {
    let (config, mut state, mut store) = setup();
    let mut sync = TelemetrySync::new(&config);

    state.distance = Some(30.0);
    state.acidity = 6.5;
    store.fail_path(paths::DISTANCE);
    sync.report(&mut state, 0, &mut store);
    assert!(store.writes_to(paths::DISTANCE).is_empty());
    assert_eq!(state.last_reported.distance, None);
    assert_eq!(store.value(paths::ACIDITY), Some("6.50"));

    store.heal_path(paths::DISTANCE);
    sync.report(&mut state, 2_500, &mut store);
    assert_eq!(store.writes_to(paths::DISTANCE), vec!["30.0"]);
    assert_eq!(store.writes_to(paths::ACIDITY), vec!["6.50"], "acidity unchanged");
}

#[test]
fn pump_edges_are_pushed_once_per_change() {
    let (config, mut state, mut store) = setup();
    let mut sync = TelemetrySync::new(&config);

    sync.report(&mut state, 0, &mut store);
    state.pump = PumpState::Running { started_at: 2_500 };
    sync.report(&mut state, 2_500, &mut store);
    sync.report(&mut state, 3_000, &mut store);
    state.pump = PumpState::Locked;
    sync.report_edges(&mut state, &mut store);
    sync.report(&mut state, 5_000, &mut store);
    state.pump = PumpState::Idle;
    sync.report(&mut state, 7_500, &mut store);

    // Locked and Idle both read as "off".
    assert_eq!(store.writes_to(paths::PUMP), vec!["0", "1", "0"]);
    assert_eq!(store.writes_to(paths::VALVE), vec!["90"]);
}

#[test]
fn operator_session_round_trip() {
    let (config, mut state, mut store) = setup();
    let commands = CommandSync::new(&config);

    store.set(paths::DEVICE_MODE, "manual");
    store.set(paths::COMMAND_VALVE, "120");
    store.set(paths::COMMAND_PUMP, "false");
    let outcome = commands.poll(&mut state, &mut store);
    assert_eq!(outcome.mode_change, Some((Mode::Auto, Mode::Manual)));
    assert!(outcome.override_updated);
    assert_eq!(state.manual_override.valve_target, Some(120));
    assert!(!state.manual_override.pump_requested);

    // Garbage and blanks leave the previous values in place.
    store.set(paths::COMMAND_VALVE, "wide open");
    store.set(paths::COMMAND_PUMP, "");
    let outcome = commands.poll(&mut state, &mut store);
    assert_eq!(outcome.mode_change, None);
    assert!(!outcome.override_updated);
    assert_eq!(state.manual_override.valve_target, Some(120));

    store.set(paths::COMMAND_VALVE, "400");
    store.set(paths::COMMAND_PUMP, "1");
    commands.poll(&mut state, &mut store);
    assert_eq!(state.manual_override.valve_target, Some(180));
    assert!(state.manual_override.pump_requested);

    store.set(paths::DEVICE_MODE, "auto");
    let outcome = commands.poll(&mut state, &mut store);
    assert_eq!(outcome.mode_change, Some((Mode::Manual, Mode::Auto)));
    assert_eq!(state.manual_override.valve_target, Some(180), "override survives a mode switch");
}

#[test]
fn unreachable_store_changes_nothing() {
    let (config, mut state, mut store) = setup();
    let commands = CommandSync::new(&config);
    let mut sync = TelemetrySync::new(&config);

    store.reachable = false;
    state.distance = Some(8.0);
    let report = sync.report(&mut state, 0, &mut store);
    assert_eq!(report.pushed, 0);
    assert!(report.failed > 0);
    assert_eq!(state.last_reported.distance, None);

    let outcome = commands.poll(&mut state, &mut store);
    assert_eq!(outcome.mode_change, None);
    assert_eq!(state.mode, Mode::Auto);
}
