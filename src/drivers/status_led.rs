//! Connectivity status LED.
//!
//! The on-board LED is lit while the station is associated with the
//! access point and dark otherwise.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LED GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    lit: bool,
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLed {
    pub fn new() -> Self {
        Self { lit: false }
    }

    pub fn set(&mut self, lit: bool) {
        hw_init::gpio_write(pins::STATUS_LED_GPIO, lit);
        self.lit = lit;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
