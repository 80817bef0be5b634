//! Device state: the single blackboard the control loop mutates.
//!
//! [`DeviceState`] is owned by [`AppService`](super::service::AppService)
//! and handed by `&mut` to each component in turn.  Pump and alarm use
//! tagged states so an actuator can never be "running" and "locked out"
//! at the same time, and a start timestamp only exists while it runs.

use crate::config::SystemConfig;

// ---------------------------------------------------------------------------
// Actuator lifecycles
// ---------------------------------------------------------------------------

/// Drain pump lifecycle.
///
/// `Idle → Running` is the one-shot trigger, `Running → Locked` happens when
/// the run length elapses, `Locked → Idle` only once the level is safe again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Idle,
    Running { started_at: u64 },
    Locked,
}

impl PumpState {
    /// Whether the relay should be energised.
    pub fn is_on(self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }
}

/// Buzzer lifecycle; same shape as [`PumpState`] with its own lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    Active { started_at: u64 },
    Locked,
}

impl AlarmState {
    pub fn is_on(self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }
}

// ---------------------------------------------------------------------------
// Operating mode and remote override
// ---------------------------------------------------------------------------

/// Who drives the actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The lockout controller reacts to the measured level.
    #[default]
    Auto,
    /// The operator's override values drive valve and pump.
    Manual,
}

impl Mode {
    /// Wire name used in the remote store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

/// Last command received from the remote store.  Kept across mode switches
/// so a later switch to manual has something to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualOverride {
    pub valve_target: Option<u8>,
    pub pump_requested: bool,
}

/// Values most recently pushed to the remote store successfully.
/// `None` means never reported, so the first tick always pushes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LastReported {
    pub distance: Option<f32>,
    pub acidity: Option<f32>,
    pub valve_angle: Option<u8>,
    pub pump_on: Option<bool>,
}

// ---------------------------------------------------------------------------
// DeviceState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DeviceState {
    /// Last valid distance to the water surface (cm).  Kept across
    /// transient sensor failures; `None` until the first good echo.
    pub distance: Option<f32>,
    /// Last acidity reading (pH).
    pub acidity: f32,
    /// Probe voltage behind `acidity`.
    pub acidity_voltage: f32,
    /// Commanded valve servo angle, 0..=180.
    pub valve_angle: u8,
    pub pump: PumpState,
    pub alarm: AlarmState,
    pub mode: Mode,
    pub manual_override: ManualOverride,
    pub last_reported: LastReported,
    /// True while the distance sensor is in its escalated failure state.
    pub sensor_fault: bool,
}

impl DeviceState {
    /// Boot defaults: valve closed, pump and alarm idle, automatic mode.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            distance: None,
            acidity: 0.0,
            acidity_voltage: 0.0,
            valve_angle: config.valve_closed_angle,
            pump: PumpState::Idle,
            alarm: AlarmState::Idle,
            mode: Mode::Auto,
            manual_override: ManualOverride::default(),
            last_reported: LastReported::default(),
            sensor_fault: false,
        }
    }
}
