//! Blocking delay provider implementing `embedded_hal::delay::DelayNs`.
//!
//! Sensor drivers take any `DelayNs` so host tests can substitute a
//! no-op.  Sub-millisecond waits (trigger pulses) busy-wait in ROM;
//! millisecond waits (ADC sample spacing) yield to FreeRTOS.

use embedded_hal::delay::DelayNs;

use crate::drivers::hw_init;

#[derive(Debug, Default, Clone, Copy)]
pub struct SysDelay;

impl DelayNs for SysDelay {
    fn delay_ns(&mut self, ns: u32) {
        hw_init::delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        hw_init::delay_us(us);
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, _ms: u32) {}
}
