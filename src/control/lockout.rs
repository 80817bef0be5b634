//! One-shot lockout controller.
//!
//! Converts a distance reading into valve / pump / alarm targets.  The
//! pump and alarm each fire **once** per critical episode:
//!
//! ```text
//!            critical            run elapsed           safe
//!   Idle ──────────────▶ Running ───────────▶ Locked ───────▶ Idle
//!                          │                                    ▲
//!                          └────────────── safe ────────────────┘ (alarm only:
//!                                                           forced off at once)
//! ```
//!
//! However long the level stays critical, and however noisy the sensor is
//! around the threshold, an actuator cannot re-fire until a safe-zone
//! reading has been observed.

use log::{info, warn};

use crate::app::state::{AlarmState, DeviceState, PumpState};
use crate::config::SystemConfig;

/// Distance as seen by the controller after sensor-fault filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceInput {
    /// A valid echo distance in cm.
    Measured(f32),
    /// The sensor has failed persistently.  Treated as critical.
    SensorFailed,
}

impl DistanceInput {
    /// Critical zone: at or below `safe_threshold_cm`, or no working sensor.
    pub fn is_critical(self, safe_threshold_cm: f32) -> bool {
        match self {
            Self::Measured(cm) => cm <= safe_threshold_cm,
            Self::SensorFailed => true,
        }
    }
}

/// Output levels for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorTargets {
    pub valve_angle: u8,
    pub pump_on: bool,
    pub alarm_on: bool,
}

impl ActuatorTargets {
    /// Targets implied by the current device state.
    pub fn from_state(state: &DeviceState) -> Self {
        Self {
            valve_angle: state.valve_angle,
            pump_on: state.pump.is_on(),
            alarm_on: state.alarm.is_on(),
        }
    }
}

/// Which actuators a call to [`LockoutController::expire`] locked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Expired {
    pub pump: bool,
    pub alarm: bool,
}

impl Expired {
    pub fn any(self) -> bool {
        self.pump || self.alarm
    }
}

pub struct LockoutController {
    safe_threshold_cm: f32,
    pump_run_ms: u64,
    alarm_run_ms: u64,
    valve_open_angle: u8,
    valve_closed_angle: u8,
}

impl LockoutController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            safe_threshold_cm: config.safe_distance_cm,
            pump_run_ms: config.pump_run_ms,
            alarm_run_ms: config.alarm_run_ms,
            valve_open_angle: config.valve_open_angle,
            valve_closed_angle: config.valve_closed_angle,
        }
    }

    /// Lock out any actuator whose run length has elapsed.
    ///
    /// Runs every control tick and, so that runs end on time rather than on
    /// the next sensing tick, on every loop iteration as well.
    pub fn expire(&self, state: &mut DeviceState, now: u64) -> Expired {
        let mut expired = Expired::default();

        if let PumpState::Running { started_at } = state.pump {
            if now.saturating_sub(started_at) >= self.pump_run_ms {
                state.pump = PumpState::Locked;
                expired.pump = true;
                info!("Pump: OFF (locked)");
            }
        }

        if let AlarmState::Active { started_at } = state.alarm {
            if now.saturating_sub(started_at) >= self.alarm_run_ms {
                state.alarm = AlarmState::Locked;
                expired.alarm = true;
                info!("Alarm: OFF (locked)");
            }
        }

        expired
    }

    /// Run one control tick against `distance`.
    pub fn evaluate(&self, state: &mut DeviceState, distance: DistanceInput, now: u64) -> ActuatorTargets {
        self.expire(state, now);

        if distance.is_critical(self.safe_threshold_cm) {
            self.enter_critical(state, now);
        } else {
            self.enter_safe(state);
        }

        ActuatorTargets::from_state(state)
    }

    fn enter_safe(&self, state: &mut DeviceState) {
        if state.pump.is_locked() {
            state.pump = PumpState::Idle;
            info!("Lockout reset: pump ready");
        }

        match state.alarm {
            AlarmState::Locked => {
                state.alarm = AlarmState::Idle;
                info!("Lockout reset: alarm ready");
            }
            // Safe zone always wins over an alarm still sounding.
            AlarmState::Active { .. } => {
                state.alarm = AlarmState::Idle;
                info!("Alarm: OFF (level safe)");
            }
            AlarmState::Idle => {}
        }

        state.valve_angle = self.valve_open_angle;
    }

    fn enter_critical(&self, state: &mut DeviceState, now: u64) {
        state.valve_angle = self.valve_closed_angle;

        if state.pump == PumpState::Idle {
            state.pump = PumpState::Running { started_at: now };
            warn!("ACTION: pump ON (level critical)");
        }

        if state.alarm == AlarmState::Idle {
            state.alarm = AlarmState::Active { started_at: now };
            warn!("ACTION: alarm ON (level critical)");
        }
    }
}
