//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the device state and every decision component.  It
//! exposes a hardware-agnostic API; all I/O flows through port traits
//! injected at call sites, so the whole service runs against mocks.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                  │          AppService          │
//! ActuatorPort ◀── │ Guard · Lockout · Arbiter    │ ◀─▶ RemoteStorePort
//!                  │ Telemetry · Commands · Sched │ ◀── ConnectivityPort
//!                  └──────────────────────────────┘
//! ```
//!
//! One loop iteration is:
//!
//! 1. connectivity check (bounded reconnect when down)
//! 2. timed lockout expiry
//! 3. whichever cadences are due: control tick, then command poll

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::arbiter::ModeArbiter;
use crate::control::lockout::{ActuatorTargets, DistanceInput, LockoutController};
use crate::error::{Error, SensorFault};
use crate::safety::{GuardVerdict, SensorFaultGuard};
use crate::scheduler::{LoopTask, Scheduler};
use crate::sync::commands::CommandSync;
use crate::sync::telemetry::TelemetrySync;

use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, ConnectivityError, ConnectivityPort, EventSink, RemoteStorePort, SensorPort};
use super::state::{AlarmState, DeviceState, PumpState};

/// Result of one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The controller ran and produced these targets.
    Evaluated(ActuatorTargets),
    /// A transient sensor fault skipped evaluation and telemetry.
    Skipped(SensorFault),
}

/// Actuator-relevant state captured before a decision, for change events.
#[derive(Clone, Copy)]
struct Before {
    pump: PumpState,
    alarm: AlarmState,
    valve_angle: u8,
}

impl Before {
    fn of(state: &DeviceState) -> Self {
        Self {
            pump: state.pump,
            alarm: state.alarm,
            valve_angle: state.valve_angle,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    state: DeviceState,
    guard: SensorFaultGuard,
    lockout: LockoutController,
    arbiter: ModeArbiter,
    telemetry: TelemetrySync,
    commands: CommandSync,
    scheduler: Scheduler,
    /// Outputs last written to the actuators; `None` before `start`.
    applied: Option<ActuatorTargets>,
    /// Last connectivity state shown on the indicator.
    indicator: Option<bool>,
    /// The device status and mode have reached the store.
    announced: bool,
    /// Last reconnect failure, so a repeating one is logged once.
    link_error: Option<ConnectivityError>,
    tick_count: u64,
}

impl AppService {
    /// Build the service.  Fails if `config` does not validate.
    ///
    /// Does **not** touch any hardware; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            state: DeviceState::new(&config),
            guard: SensorFaultGuard::new(config.max_sensor_faults),
            lockout: LockoutController::new(&config),
            arbiter: ModeArbiter::new(),
            telemetry: TelemetrySync::new(&config),
            commands: CommandSync::new(&config),
            scheduler: Scheduler::new(&config),
            applied: None,
            indicator: None,
            announced: false,
            link_error: None,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output to its boot default and announce the device.
    pub fn start(
        &mut self,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        online: bool,
        sink: &mut impl EventSink,
    ) {
        self.apply_outputs(hw);
        self.show_connectivity(online, hw, sink);

        if online {
            self.announce(store);
        }

        sink.emit(&AppEvent::Started(self.state.mode));
        info!(
            "AppService started: mode={}, valve={}°",
            self.state.mode.as_str(),
            self.state.valve_angle
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One pass of the main loop at monotonic time `now_ms`.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn run_iteration(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        store: &mut impl RemoteStorePort,
        net: &mut impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) {
        let online = self.check_connectivity(now_ms, net);
        self.show_connectivity(online, hw, sink);

        self.service_timers(now_ms, hw, store, online, sink);

        for task in self.scheduler.poll(now_ms) {
            match task {
                LoopTask::Control => {
                    // Booted offline, or the store missed the first attempt.
                    if online && !self.announced {
                        self.announce(store);
                    }
                    self.control_tick(now_ms, hw, store, online, sink);
                }
                LoopTask::CommandPoll if online => self.command_poll(store, sink),
                LoopTask::CommandPoll => debug!("Command poll skipped: offline"),
            }
        }
    }

    /// End any pump or alarm run whose time is up.  Cheap; runs every
    /// iteration so runs end on time rather than on the next control tick.
    pub fn service_timers(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        online: bool,
        sink: &mut impl EventSink,
    ) {
        let before = Before::of(&self.state);
        let expired = self.lockout.expire(&mut self.state, now_ms);
        if !expired.any() {
            return;
        }
        self.commit(before, hw, sink);
        if expired.pump && online {
            self.telemetry.report_edges(&mut self.state, store);
        }
    }

    /// Sense, decide, actuate, report.
    pub fn control_tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        store: &mut impl RemoteStorePort,
        online: bool,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        self.tick_count += 1;

        // 1. Distance, filtered through the fault guard
        let input = match self.guard.filter(hw.measure_distance()) {
            GuardVerdict::Skip(fault) => {
                sink.emit(&AppEvent::SensorFault {
                    consecutive: self.guard.consecutive_faults(),
                    escalated: false,
                });
                return TickOutcome::Skipped(fault);
            }
            GuardVerdict::Evaluate(input) => input,
        };

        match input {
            DistanceInput::Measured(cm) => {
                if self.state.sensor_fault {
                    self.state.sensor_fault = false;
                    sink.emit(&AppEvent::SensorRecovered);
                }
                self.state.distance = Some(cm);
            }
            DistanceInput::SensorFailed => {
                self.state.sensor_fault = true;
                sink.emit(&AppEvent::SensorFault {
                    consecutive: self.guard.consecutive_faults(),
                    escalated: true,
                });
            }
        }

        // 2. Acidity
        let acidity = hw.measure_acidity();
        self.state.acidity = acidity.ph;
        self.state.acidity_voltage = acidity.voltage;

        // 3. Decide and actuate
        let before = Before::of(&self.state);
        let targets = self
            .arbiter
            .arbitrate(&self.lockout, &mut self.state, input, now_ms);
        self.commit(before, hw, sink);

        // 4. Report
        if online {
            self.telemetry.report(&mut self.state, now_ms, store);
        }
        sink.emit(&AppEvent::Telemetry(self.telemetry_data()));

        TickOutcome::Evaluated(targets)
    }

    /// Pull the operator's mode and override.  Takes effect on the next
    /// control tick.
    pub fn command_poll(&mut self, store: &mut impl RemoteStorePort, sink: &mut impl EventSink) {
        let outcome = self.commands.poll(&mut self.state, store);
        if let Some((from, to)) = outcome.mode_change {
            sink.emit(&AppEvent::ModeChanged { from, to });
        }
        if outcome.override_updated {
            debug!("Manual override now {:?}", self.state.manual_override);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn telemetry_data(&self) -> TelemetryData {
        TelemetryData {
            distance_cm: self.state.distance,
            acidity_ph: self.state.acidity,
            acidity_voltage: self.state.acidity_voltage,
            valve_angle: self.state.valve_angle,
            pump: self.state.pump,
            alarm: self.state.alarm,
            mode: self.state.mode,
            sensor_fault: self.state.sensor_fault,
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Control ticks run since startup (skipped ones included).
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn check_connectivity(&mut self, now_ms: u64, net: &mut impl ConnectivityPort) -> bool {
        if net.is_connected() {
            self.link_error = None;
            return true;
        }
        match net.reconnect(now_ms) {
            Ok(()) | Err(ConnectivityError::AlreadyConnected) => {
                self.link_error = None;
                true
            }
            Err(ConnectivityError::BackingOff { retry_in_ms }) => {
                debug!("Offline; next reconnect in {} ms", retry_in_ms);
                false
            }
            Err(e) => {
                if self.link_error.as_ref() == Some(&e) {
                    debug!("Reconnect failed again: {}", e);
                } else {
                    warn!("Reconnect failed: {}", e);
                    self.link_error = Some(e);
                }
                false
            }
        }
    }

    /// Publish device status and mode; retried on later control ticks
    /// until one attempt lands completely.
    fn announce(&mut self, store: &mut impl RemoteStorePort) {
        let r = self.telemetry.announce(self.state.mode, store);
        self.announced = r.failed == 0;
        if self.announced {
            info!("Device announced to the store");
        } else {
            warn!("Announcement incomplete ({} failed)", r.failed);
        }
    }

    fn show_connectivity(&mut self, online: bool, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if self.indicator == Some(online) {
            return;
        }
        hw.set_status_indicator(online);
        if self.indicator.is_some() {
            sink.emit(&AppEvent::ConnectivityChanged { connected: online });
        }
        self.indicator = Some(online);
    }

    /// Emit change events against `before`, then write changed outputs.
    fn commit(&mut self, before: Before, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let s = &self.state;
        if s.pump != before.pump {
            sink.emit(&AppEvent::PumpChanged {
                from: before.pump,
                to: s.pump,
            });
        }
        if s.alarm != before.alarm {
            sink.emit(&AppEvent::AlarmChanged {
                from: before.alarm,
                to: s.alarm,
            });
        }
        if s.valve_angle != before.valve_angle {
            sink.emit(&AppEvent::ValveMoved {
                from: before.valve_angle,
                to: s.valve_angle,
            });
        }
        self.apply_outputs(hw);
    }

    /// Write only the outputs that differ from what was last written.
    fn apply_outputs(&mut self, hw: &mut impl ActuatorPort) {
        let want = ActuatorTargets::from_state(&self.state);
        let prev = self.applied;

        if prev.map(|p| p.valve_angle) != Some(want.valve_angle) {
            hw.set_valve(want.valve_angle);
        }
        if prev.map(|p| p.pump_on) != Some(want.pump_on) {
            hw.set_pump(want.pump_on);
        }
        if prev.map(|p| p.alarm_on) != Some(want.alarm_on) {
            hw.set_alarm(want.alarm_on);
        }

        self.applied = Some(want);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_rejected() {
        let config = SystemConfig {
            control_interval_ms: 0,
            ..SystemConfig::default()
        };
        assert!(matches!(AppService::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn fresh_service_reports_boot_state() {
        let app = AppService::new(SystemConfig::default()).unwrap();
        let t = app.telemetry_data();
        assert_eq!(t.valve_angle, 90);
        assert_eq!(t.pump, PumpState::Idle);
        assert_eq!(t.alarm, AlarmState::Idle);
        assert!(t.distance_cm.is_none());
        assert_eq!(app.tick_count(), 0);
    }
}
