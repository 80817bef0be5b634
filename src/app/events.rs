//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; the station only has a serial log.

use super::state::{AlarmState, Mode, PumpState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the boot mode).
    Started(Mode),

    /// One control tick's readings and actuator states.
    Telemetry(TelemetryData),

    /// The pump moved between lifecycle states.
    PumpChanged { from: PumpState, to: PumpState },

    /// The alarm moved between lifecycle states.
    AlarmChanged { from: AlarmState, to: AlarmState },

    /// The valve servo was commanded to a new angle.
    ValveMoved { from: u8, to: u8 },

    /// A command poll switched the operating mode.
    ModeChanged { from: Mode, to: Mode },

    /// A distance read failed.  `escalated` once the consecutive limit
    /// is reached and the sensor is treated as failed.
    SensorFault { consecutive: u8, escalated: bool },

    /// A valid distance arrived after an escalated sensor failure.
    SensorRecovered,

    /// Network association was lost / restored.
    ConnectivityChanged { connected: bool },
}

/// A point-in-time snapshot suitable for the console status line.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub distance_cm: Option<f32>,
    pub acidity_ph: f32,
    pub acidity_voltage: f32,
    pub valve_angle: u8,
    pub pump: PumpState,
    pub alarm: AlarmState,
    pub mode: Mode,
    pub sensor_fault: bool,
}
