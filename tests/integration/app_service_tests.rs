//! AppService driven through its loop against mock adapters.
//!
//! Time is simulated: each test steps `run_iteration` (or a single stage)
//! with explicit millisecond timestamps.

use terraflow::app::events::AppEvent;
use terraflow::app::service::{AppService, TickOutcome};
use terraflow::app::state::{AlarmState, Mode, PumpState};
use terraflow::config::SystemConfig;
use terraflow::error::SensorFault;
use terraflow::sync::paths;

use super::mock_hw::{ActuatorCall, MockHardware, MockNet, MockStore, RecordingSink};

struct Rig {
    app: AppService,
    hw: MockHardware,
    store: MockStore,
    net: MockNet,
    sink: RecordingSink,
}

impl Rig {
    fn online() -> Self {
        Self::with_net(MockNet::online())
    }

    fn with_net(net: MockNet) -> Self {
        let mut rig = Self {
            app: AppService::new(SystemConfig::default()).unwrap(),
            hw: MockHardware::new(),
            store: MockStore::new(),
            net,
            sink: RecordingSink::new(),
        };
        let online = rig.net.connected;
        rig.app.start(&mut rig.hw, &mut rig.store, online, &mut rig.sink);
        rig
    }

    /// Step the loop every 100 ms over `from..=to`.
    fn run(&mut self, from: u64, to: u64) {
        let mut t = from;
        while t <= to {
            self.app
                .run_iteration(t, &mut self.hw, &mut self.store, &mut self.net, &mut self.sink);
            t += 100;
        }
    }

    fn tick(&mut self, now: u64) -> TickOutcome {
        let online = self.net.connected;
        self.app
            .control_tick(now, &mut self.hw, &mut self.store, online, &mut self.sink)
    }

    fn poll_commands(&mut self) {
        self.app.command_poll(&mut self.store, &mut self.sink);
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_drives_safe_outputs_and_announces() {
    let rig = Rig::online();

    assert_eq!(rig.hw.valve(), Some(90), "valve must boot closed");
    assert!(!rig.hw.pump_on());
    assert!(!rig.hw.alarm_on());
    assert_eq!(rig.hw.indicator(), Some(true));

    assert_eq!(rig.store.value(paths::DEVICE_STATUS), Some("1"));
    assert_eq!(rig.store.value(paths::DEVICE_MODE), Some("\"auto\""));
    assert_eq!(rig.sink.events.last(), Some(&AppEvent::Started(Mode::Auto)));
}

// ── One-shot lockout ──────────────────────────────────────────

#[test]
fn critical_run_fires_once_then_stays_locked() {
    let mut rig = Rig::online();
    rig.hw.hold_distance(Some(4.0));

    let outcome = rig.tick(0);
    assert!(matches!(outcome, TickOutcome::Evaluated(t) if t.pump_on && t.alarm_on && t.valve_angle == 90));
    assert!(rig.hw.pump_on() && rig.hw.alarm_on());
    assert_eq!(rig.app.state().pump, PumpState::Running { started_at: 0 });

    rig.tick(2_000);
    assert!(!rig.hw.pump_on(), "pump must stop once its run has elapsed");
    assert!(!rig.hw.alarm_on());
    assert_eq!(rig.app.state().pump, PumpState::Locked);

    rig.tick(2_100);
    assert!(!rig.hw.pump_on(), "locked pump must not restart while critical");
    assert_eq!(rig.hw.count(ActuatorCall::Pump(true)), 1);
    assert_eq!(rig.hw.count(ActuatorCall::Alarm(true)), 1);
}

#[test]
fn run_ends_between_ticks_and_store_sees_it_at_once() {
    let mut rig = Rig::online();
    rig.hw.hold_distance(Some(4.0));

    // First control tick at 2500 starts the run.
    rig.run(0, 2_500);
    assert!(rig.hw.pump_on());
    assert_eq!(rig.store.writes_to(paths::PUMP), vec!["1"]);

    // Expiry at 4500 is two ticks' worth of loop iterations before 5000.
    rig.run(2_600, 4_500);
    assert!(!rig.hw.pump_on());
    assert_eq!(rig.store.writes_to(paths::PUMP), vec!["1", "0"]);

    rig.run(4_600, 20_000);
    assert_eq!(rig.hw.count(ActuatorCall::Pump(true)), 1);
    assert_eq!(rig.store.writes_to(paths::PUMP), vec!["1", "0"]);
}

#[test]
fn safe_reading_rearms_the_next_episode() {
    let mut rig = Rig::online();
    rig.hw.hold_distance(Some(4.0));
    rig.run(0, 10_000);
    assert_eq!(rig.hw.count(ActuatorCall::Pump(true)), 1);

    rig.hw.hold_distance(Some(6.0));
    rig.run(10_100, 12_500);
    assert_eq!(rig.hw.valve(), Some(0), "safe level opens the valve");
    assert_eq!(rig.app.state().pump, PumpState::Idle);
    assert_eq!(rig.app.state().alarm, AlarmState::Idle);

    rig.hw.hold_distance(Some(4.0));
    rig.run(12_600, 15_000);
    assert_eq!(rig.hw.valve(), Some(90));
    assert_eq!(rig.hw.count(ActuatorCall::Pump(true)), 2);
    assert_eq!(rig.hw.count(ActuatorCall::Alarm(true)), 2);
}

#[test]
fn threshold_reading_counts_as_critical() {
    let mut rig = Rig::online();
    rig.hw.hold_distance(Some(5.0));
    rig.tick(0);
    assert!(rig.hw.pump_on());
    assert_eq!(rig.hw.valve(), Some(90));
}

// ── Manual mode ───────────────────────────────────────────────

#[test]
fn manual_pump_request_is_one_shot_until_safe_in_auto() {
    let mut rig = Rig::online();
    rig.hw.hold_distance(Some(20.0));
    rig.store.set(paths::DEVICE_MODE, "manual");
    rig.store.set(paths::COMMAND_VALVE, "45");
    rig.store.set(paths::COMMAND_PUMP, "1");

    rig.poll_commands();
    assert_eq!(rig.app.state().mode, Mode::Manual);
    assert!(rig.sink.events.contains(&AppEvent::ModeChanged {
        from: Mode::Auto,
        to: Mode::Manual
    }));

    rig.tick(100);
    assert_eq!(rig.hw.valve(), Some(45));
    assert!(rig.hw.pump_on());

    rig.tick(2_100);
    assert!(!rig.hw.pump_on());
    rig.tick(5_000);
    assert!(!rig.hw.pump_on(), "request still set but pump is locked");
    assert_eq!(rig.hw.count(ActuatorCall::Pump(true)), 1);

    // A safe evaluation in auto clears the lockout.
    rig.store.set(paths::DEVICE_MODE, "auto");
    rig.poll_commands();
    rig.tick(7_500);
    assert_eq!(rig.app.state().pump, PumpState::Idle);
    assert_eq!(rig.hw.valve(), Some(0));

    rig.store.set(paths::DEVICE_MODE, "manual");
    rig.poll_commands();
    rig.tick(10_000);
    assert!(rig.hw.pump_on());
    assert_eq!(rig.hw.count(ActuatorCall::Pump(true)), 2);
}

#[test]
fn manual_mode_ignores_critical_level() {
    let mut rig = Rig::online();
    rig.store.set(paths::DEVICE_MODE, "manual");
    rig.store.set(paths::COMMAND_VALVE, "30");
    rig.poll_commands();

    rig.hw.hold_distance(Some(2.0));
    rig.tick(0);
    assert_eq!(rig.hw.valve(), Some(30));
    assert!(!rig.hw.pump_on());
    assert!(!rig.hw.alarm_on());
}

#[test]
fn auto_mode_does_not_read_override_paths() {
    let mut rig = Rig::online();
    rig.run(0, 4_000);
    assert_eq!(rig.store.reads_of(paths::DEVICE_MODE), 2);
    assert_eq!(rig.store.reads_of(paths::COMMAND_VALVE), 0);
    assert_eq!(rig.store.reads_of(paths::COMMAND_PUMP), 0);
}

#[test]
fn unreadable_mode_keeps_current_mode() {
    let mut rig = Rig::online();
    rig.store.set(paths::DEVICE_MODE, "manual");
    rig.poll_commands();
    assert_eq!(rig.app.state().mode, Mode::Manual);

    rig.store.fail_path(paths::DEVICE_MODE);
    rig.poll_commands();
    assert_eq!(rig.app.state().mode, Mode::Manual);
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn transient_faults_skip_ticks_and_keep_last_distance() {
    let mut rig = Rig::online();
    rig.hw.hold_distance(Some(20.0));
    rig.tick(0);

    rig.hw.hold_distance(None);
    for k in 1..=4u64 {
        assert_eq!(rig.tick(k * 2_500), TickOutcome::Skipped(SensorFault::NoEcho));
    }
    assert_eq!(rig.app.state().distance, Some(20.0));
    assert!(!rig.app.state().sensor_fault);
    assert!(!rig.hw.pump_on());
}

#[test]
fn persistent_fault_is_treated_as_critical_until_recovery() {
    let mut rig = Rig::online();
    rig.hw.hold_distance(Some(20.0));
    rig.tick(0);
    assert_eq!(rig.hw.valve(), Some(0));

    rig.hw.hold_distance(None);
    for k in 1..=4u64 {
        rig.tick(k * 2_500);
    }
    let outcome = rig.tick(12_500);
    assert!(matches!(outcome, TickOutcome::Evaluated(t) if t.pump_on && t.alarm_on && t.valve_angle == 90));
    assert!(rig.app.state().sensor_fault);
    assert_eq!(rig.store.value(paths::DEVICE_SENSOR_FAULT), Some("1"));
    assert!(rig.sink.events.contains(&AppEvent::SensorFault {
        consecutive: 5,
        escalated: true
    }));

    rig.hw.hold_distance(Some(20.0));
    rig.tick(15_000);
    assert!(!rig.app.state().sensor_fault);
    assert_eq!(rig.hw.valve(), Some(0));
    assert_eq!(rig.store.value(paths::DEVICE_SENSOR_FAULT), Some("0"));
    assert!(rig.sink.events.contains(&AppEvent::SensorRecovered));
}

// ── Connectivity ──────────────────────────────────────────────

#[test]
fn offline_device_keeps_controlling_without_store_traffic() {
    let mut rig = Rig::with_net(MockNet::offline());
    assert_eq!(rig.hw.indicator(), Some(false));
    assert!(rig.store.puts.is_empty(), "no announcement while offline");

    rig.hw.hold_distance(Some(4.0));
    rig.run(0, 2_500);
    assert!(rig.hw.pump_on(), "safety control does not need the network");
    assert!(rig.store.puts.is_empty());
    assert!(rig.store.reads.is_empty());
    assert!(rig.net.reconnect_attempts > 0);
}

#[test]
fn reconnect_lights_indicator_and_resumes_telemetry() {
    let mut rig = Rig::with_net(MockNet::offline());
    rig.run(0, 2_500);
    assert!(rig.store.puts.is_empty());

    rig.net.ap_reachable = true;
    rig.run(2_600, 5_000);
    assert_eq!(rig.hw.indicator(), Some(true));
    assert!(rig.sink.events.contains(&AppEvent::ConnectivityChanged { connected: true }));
    assert_eq!(rig.store.value(paths::DISTANCE), Some("20.0"));
    assert_eq!(rig.store.value(paths::DEVICE_TIMESTAMP), Some("5000"));
}

#[test]
fn late_connection_still_announces_device() {
    let mut rig = Rig::with_net(MockNet::offline());
    assert_eq!(rig.store.value(paths::DEVICE_STATUS), None);

    rig.net.ap_reachable = true;
    rig.run(0, 10_000);
    assert_eq!(rig.store.value(paths::DEVICE_STATUS), Some("1"));
    assert_eq!(rig.store.value(paths::DEVICE_MODE), Some("\"auto\""));
    assert_eq!(rig.store.writes_to(paths::DEVICE_STATUS).len(), 1, "announced once");
}

#[test]
fn failed_announcement_is_retried_on_a_later_tick() {
    let mut store = MockStore::new();
    store.fail_path(paths::DEVICE_STATUS);
    let mut rig = Rig {
        app: AppService::new(SystemConfig::default()).unwrap(),
        hw: MockHardware::new(),
        store,
        net: MockNet::online(),
        sink: RecordingSink::new(),
    };
    rig.app.start(&mut rig.hw, &mut rig.store, true, &mut rig.sink);
    assert_eq!(rig.store.value(paths::DEVICE_STATUS), None);

    rig.store.heal_path(paths::DEVICE_STATUS);
    rig.run(0, 2_500);
    assert_eq!(rig.store.value(paths::DEVICE_STATUS), Some("1"));

    rig.run(2_600, 7_500);
    assert_eq!(rig.store.writes_to(paths::DEVICE_STATUS).len(), 1);
}
