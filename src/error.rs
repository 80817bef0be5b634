//! Unified error types for the TerraFlow firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the control core without allocation.
//!
//! None of these are fatal: the control loop logs them and carries on.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The distance or acidity sensor produced no usable reading.
    Sensor(SensorFault),
    /// The remote store could not be reached or rejected a request.
    Network(NetworkFault),
    /// A remote command value was absent or malformed.
    Command(CommandFault),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Network(e) => write!(f, "network: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// No echo arrived within the ultrasonic timeout window.
    NoEcho,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEcho => write!(f, "no echo"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorFault> for Error {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Network faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFault {
    /// The request did not complete within its timeout.
    Timeout,
    /// The store answered with a non-success HTTP status.
    Status(u16),
    /// The HTTP client failed below the protocol level (ESP-IDF error code).
    Transport(i32),
    /// The request could not be built (path or body too long, bad bytes).
    InvalidRequest,
}

impl fmt::Display for NetworkFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Transport(rc) => write!(f, "transport error (rc={rc})"),
            Self::InvalidRequest => write!(f, "invalid request"),
        }
    }
}

impl From<NetworkFault> for Error {
    fn from(e: NetworkFault) -> Self {
        Self::Network(e)
    }
}

// ---------------------------------------------------------------------------
// Command faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFault {
    /// The value is not a number where one was expected.
    NotANumber,
    /// The value parsed but lies outside the accepted range.
    OutOfRange,
}

impl fmt::Display for CommandFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "value is not a number"),
            Self::OutOfRange => write!(f, "value out of range"),
        }
    }
}

impl From<CommandFault> for Error {
    fn from(e: CommandFault) -> Self {
        Self::Command(e)
    }
}
