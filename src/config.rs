//! System configuration parameters
//!
//! All tunable parameters for the TerraFlow station.  The device has no
//! persistent storage, so these are fixed at build time; the defaults are
//! the values the station ships with.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Water level ---
    /// Distance to the water surface (cm) at or below which the level is critical
    pub safe_distance_cm: f32,
    /// Consecutive failed distance reads before the sensor is treated as failed
    pub max_sensor_faults: u8,

    // --- Actuator run lengths ---
    /// How long the pump runs once triggered (milliseconds)
    pub pump_run_ms: u64,
    /// How long the alarm sounds once triggered (milliseconds)
    pub alarm_run_ms: u64,

    // --- Valve ---
    /// Servo angle for the open valve (safe level)
    pub valve_open_angle: u8,
    /// Servo angle for the closed valve (critical level, boot default)
    pub valve_closed_angle: u8,

    // --- pH probe ---
    /// Linear calibration slope (pH per volt)
    pub ph_slope: f32,
    /// Linear calibration offset (pH at 0 V)
    pub ph_offset: f32,
    /// ADC samples averaged per acidity reading
    pub ph_samples: u8,

    // --- Telemetry deadbands ---
    /// Minimum distance change (cm) worth reporting
    pub distance_deadband_cm: f32,
    /// Minimum pH change worth reporting
    pub acidity_deadband_ph: f32,

    // --- Timing ---
    /// Sensing / control tick period (milliseconds)
    pub control_interval_ms: u64,
    /// Remote command poll period (milliseconds)
    pub command_poll_interval_ms: u64,

    // --- Network ---
    /// Per-request timeout for the remote store (milliseconds)
    pub network_timeout_ms: u32,
    /// Retries for sensor value and heartbeat pushes
    pub push_retries: u8,
    /// Retries for valve / pump edge pushes
    pub edge_push_retries: u8,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Water level
            safe_distance_cm: 5.0,
            max_sensor_faults: 5,

            // Actuators
            pump_run_ms: 2_000,
            alarm_run_ms: 2_000,

            // Valve
            valve_open_angle: 0,
            valve_closed_angle: 90,

            // pH probe (calibrated against pH 4.01 / 6.86 buffers)
            ph_slope: -5.70,
            ph_offset: 20.80 - 5.05,
            ph_samples: 10,

            // Telemetry
            distance_deadband_cm: 0.5,
            acidity_deadband_ph: 0.05,

            // Timing
            control_interval_ms: 2_500,
            command_poll_interval_ms: 2_000,

            // Network
            network_timeout_ms: 1_000,
            push_retries: 2,
            edge_push_retries: 1,
        }
    }
}

impl SystemConfig {
    /// Reject parameter combinations the control core cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.safe_distance_cm.is_finite() && self.safe_distance_cm > 0.0) {
            return Err(Error::Config("safe_distance_cm must be positive"));
        }
        if self.max_sensor_faults == 0 {
            return Err(Error::Config("max_sensor_faults must be at least 1"));
        }
        if self.pump_run_ms == 0 || self.alarm_run_ms == 0 {
            return Err(Error::Config("actuator run lengths must be non-zero"));
        }
        if self.valve_open_angle > 180 || self.valve_closed_angle > 180 {
            return Err(Error::Config("valve angles must be within 0..=180"));
        }
        if self.valve_open_angle == self.valve_closed_angle {
            return Err(Error::Config("valve open and closed angles must differ"));
        }
        if self.ph_samples == 0 {
            return Err(Error::Config("ph_samples must be at least 1"));
        }
        if self.distance_deadband_cm < 0.0 || self.acidity_deadband_ph < 0.0 {
            return Err(Error::Config("telemetry deadbands must not be negative"));
        }
        if self.control_interval_ms == 0 || self.command_poll_interval_ms == 0 {
            return Err(Error::Config("loop cadences must be non-zero"));
        }
        if self.network_timeout_ms == 0 {
            return Err(Error::Config("network_timeout_ms must be non-zero"));
        }
        Ok(())
    }
}
