//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, remote store, Wi-Fi, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! or sockets directly, and never sleeps.  Anything that blocks does so
//! inside an adapter, bounded by a timeout.

use core::fmt;

use crate::error::NetworkFault;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One averaged pH measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AcidityReading {
    /// Calibrated acidity (pH).
    pub ph: f32,
    /// Averaged probe voltage the pH was derived from.
    pub voltage: f32,
}

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Distance to the water surface in cm, or `None` when no echo arrived
    /// within the measurement window.
    fn measure_distance(&mut self) -> Option<f32>;

    /// Acidity averaged over a small fixed number of samples.
    fn measure_acidity(&mut self) -> AcidityReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Move the valve servo (0–180°).
    fn set_valve(&mut self, angle: u8);

    /// Energise or release the pump relay.
    fn set_pump(&mut self, on: bool);

    /// Sound or silence the buzzer.
    fn set_alarm(&mut self, on: bool);

    /// Connectivity indicator LED.
    fn set_status_indicator(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Remote store port (driven adapter: domain ↔ cloud database)
// ───────────────────────────────────────────────────────────────

/// Keyed scalar store reached over an unreliable request/response link.
///
/// Paths are hierarchical (`/sensors/distance`); values are JSON scalars
/// in their textual form (`12.5`, `1`, `"auto"`).
pub trait RemoteStorePort {
    /// Write `value` at `path`.  Retries up to `max_retries` extra times,
    /// each attempt bounded by `timeout_ms`.
    fn put(
        &mut self,
        path: &str,
        value: &str,
        timeout_ms: u32,
        max_retries: u8,
    ) -> Result<(), NetworkFault>;

    /// Read the value at `path`.  `Ok(None)` means the store holds no value
    /// there; string values come back without their JSON quotes.
    fn get(&mut self, path: &str, timeout_ms: u32) -> Result<Option<String>, NetworkFault>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ Wi-Fi)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AuthFailed,
    AlreadyConnected,
    /// A reconnect was requested before the backoff window elapsed.
    BackingOff { retry_in_ms: u64 },
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AuthFailed => write!(f, "WiFi authentication failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
            Self::BackingOff { retry_in_ms } => write!(f, "reconnect backing off ({} ms left)", retry_in_ms),
        }
    }
}

/// Network association, polled at the top of every loop iteration.
pub trait ConnectivityPort {
    fn is_connected(&self) -> bool;

    /// Blocking, bounded reconnect attempt.  `now_ms` lets the adapter pace
    /// attempts so a dead access point cannot starve sensing.
    fn reconnect(&mut self, now_ms: u64) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
