//! Drain pump relay driver.
//!
//! A single-channel relay module switches the pump supply.  The module's
//! input is **active LOW**: driving the pin low closes the relay.
//!
//! ## Safety contract
//!
//! How long the pump runs is decided by the lockout controller; this
//! driver is a dumb actuator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the relay GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct PumpRelay {
    on: bool,
}

impl Default for PumpRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl PumpRelay {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::PUMP_RELAY_GPIO, relay_level(on));
        self.on = on;
    }

    pub fn is_running(&self) -> bool {
        self.on
    }
}

/// Pin level that puts the relay in the requested state.
pub(crate) fn relay_level(on: bool) -> bool {
    !on
}
