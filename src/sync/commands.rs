//! Command poll: remote store → mode and manual override.
//!
//! The operator's dashboard writes `/device/mode` and, for manual control,
//! `/commands/servo2` and `/commands/pump`.  A read that fails, comes back
//! empty, or does not parse never changes anything: the previous mode and
//! override stay in force.

use log::{info, warn};

use super::paths;
use crate::app::ports::RemoteStorePort;
use crate::app::state::{DeviceState, Mode};
use crate::config::SystemConfig;
use crate::error::CommandFault;

/// What one poll changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// `(from, to)` when the mode switched.
    pub mode_change: Option<(Mode, Mode)>,
    /// Whether the manual override was updated.
    pub override_updated: bool,
}

pub struct CommandSync {
    timeout_ms: u32,
}

impl CommandSync {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            timeout_ms: config.network_timeout_ms,
        }
    }

    pub fn poll<S: RemoteStorePort>(&self, state: &mut DeviceState, store: &mut S) -> PollOutcome {
        let mut outcome = PollOutcome::default();

        if let Some(raw) = self.read(store, paths::DEVICE_MODE) {
            let mode = parse_mode(&raw);
            if mode != state.mode {
                info!("Mode: {} -> {}", state.mode.as_str(), mode.as_str());
                outcome.mode_change = Some((state.mode, mode));
                state.mode = mode;
            }
        }

        if state.mode != Mode::Manual {
            return outcome;
        }

        if let Some(raw) = self.read(store, paths::COMMAND_VALVE) {
            match parse_valve_target(&raw) {
                Ok(angle) => {
                    if state.manual_override.valve_target != Some(angle) {
                        state.manual_override.valve_target = Some(angle);
                        outcome.override_updated = true;
                    }
                }
                Err(e) => warn!("Command: valve value {:?} rejected: {}", raw, e),
            }
        }

        if let Some(raw) = self.read(store, paths::COMMAND_PUMP) {
            match parse_pump_request(&raw) {
                Ok(requested) => {
                    if state.manual_override.pump_requested != requested {
                        state.manual_override.pump_requested = requested;
                        outcome.override_updated = true;
                    }
                }
                Err(e) => warn!("Command: pump value {:?} rejected: {}", raw, e),
            }
        }

        outcome
    }

    /// `Some` only for a non-empty value the store actually returned.
    fn read<S: RemoteStorePort>(&self, store: &mut S, path: &str) -> Option<String> {
        match store.get(path, self.timeout_ms) {
            Ok(Some(v)) if !v.trim().is_empty() => Some(v),
            Ok(_) => None,
            Err(e) => {
                warn!("Command: read {} failed: {}", path, e);
                None
            }
        }
    }
}

/// Any value mentioning `manual` selects manual mode; anything else is auto.
pub fn parse_mode(raw: &str) -> Mode {
    if raw.contains("manual") {
        Mode::Manual
    } else {
        Mode::Auto
    }
}

/// Integer (or decimal, truncated) angle, clamped into 0..=180.
pub fn parse_valve_target(raw: &str) -> Result<u8, CommandFault> {
    let raw = raw.trim();
    let value = match raw.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let f = raw.parse::<f64>().map_err(|_| CommandFault::NotANumber)?;
            if !f.is_finite() {
                return Err(CommandFault::OutOfRange);
            }
            f as i64
        }
    };
    // Clamped into range, so the cast cannot truncate.
    Ok(value.clamp(0, 180) as u8)
}

/// `1` / `true` requests a run; any other number or `false` does not.
pub fn parse_pump_request(raw: &str) -> Result<bool, CommandFault> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => {
            let f = other.parse::<f64>().map_err(|_| CommandFault::NotANumber)?;
            Ok(f == 1.0)
        }
    }
}
