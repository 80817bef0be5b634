//! HC-SR04 ultrasonic distance sensor driver.
//!
//! A 10 µs trigger pulse starts a measurement; the echo pin then goes high
//! for as long as the sound takes to reach the water surface and return.
//! No echo within 25 ms (≈ 4.3 m) counts as a failed read.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives TRIG and times ECHO via hw_init helpers.
//! On host/test: reads the echo width from a static `AtomicU32`
//! (0 = no echo) for injection.

use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

/// Echo width for ~20 cm, a comfortably safe level.
static SIM_ECHO_US: AtomicU32 = AtomicU32::new(1_166);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_echo_us(echo_us: u32) {
    SIM_ECHO_US.store(echo_us, Ordering::Relaxed);
}

/// Longest echo we wait for.
pub const ECHO_TIMEOUT_US: u32 = 25_000;

/// Speed of sound in cm/µs at room temperature.
const SOUND_CM_PER_US: f32 = 0.0343;

/// Round-trip echo time to one-way distance.
pub fn echo_to_cm(echo_us: u32) -> f32 {
    echo_us as f32 * SOUND_CM_PER_US / 2.0
}

pub struct UltrasonicSensor<D: DelayNs> {
    delay: D,
}

impl<D: DelayNs> UltrasonicSensor<D> {
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    /// One measurement; `None` when no echo arrived in time.
    pub fn measure(&mut self) -> Option<f32> {
        let echo_us = self.read_echo_us()?;
        if echo_us == 0 {
            return None;
        }
        Some(echo_to_cm(echo_us))
    }

    #[cfg(target_os = "espidf")]
    fn read_echo_us(&mut self) -> Option<u32> {
        hw_init::gpio_write(pins::ULTRASONIC_TRIG_GPIO, false);
        self.delay.delay_us(2);
        hw_init::gpio_write(pins::ULTRASONIC_TRIG_GPIO, true);
        self.delay.delay_us(10);
        hw_init::gpio_write(pins::ULTRASONIC_TRIG_GPIO, false);
        hw_init::pulse_in(pins::ULTRASONIC_ECHO_GPIO, ECHO_TIMEOUT_US)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_echo_us(&mut self) -> Option<u32> {
        self.delay.delay_us(12);
        let us = SIM_ECHO_US.load(Ordering::Relaxed);
        (us <= ECHO_TIMEOUT_US).then_some(us)
    }
}
