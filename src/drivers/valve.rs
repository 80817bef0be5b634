//! Valve servo driver.
//!
//! A hobby servo on LEDC channel 0 positions the inlet valve.  The timer
//! runs at 50 Hz with 14-bit resolution, so one duty step is
//! 20 000 µs / 16 384 ≈ 1.22 µs of pulse width.  0° maps to a 500 µs pulse
//! and 180° to 2400 µs.

use log::debug;

use crate::drivers::hw_init;
use crate::pins;

const MAX_ANGLE: u8 = 180;
const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
const DUTY_MAX: u32 = (1 << pins::SERVO_PWM_RESOLUTION_BITS) - 1;

pub struct ValveServo {
    angle: Option<u8>,
}

impl Default for ValveServo {
    fn default() -> Self {
        Self::new()
    }
}

impl ValveServo {
    pub fn new() -> Self {
        Self { angle: None }
    }

    /// Drive the servo to `angle` (clamped to 0..=180).
    pub fn set_angle(&mut self, angle: u8) {
        let angle = angle.min(MAX_ANGLE);
        let duty = angle_to_duty(angle);
        hw_init::ledc_set(hw_init::LEDC_CH_VALVE, duty);
        debug!("Valve: {}° (duty {})", angle, duty);
        self.angle = Some(angle);
    }

    /// Last commanded angle; `None` before the first command.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}

/// Pulse width in µs for `angle`.
pub fn angle_to_pulse_us(angle: u8) -> u32 {
    let angle = u32::from(angle.min(MAX_ANGLE));
    let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    pins::SERVO_MIN_PULSE_US + span * angle / u32::from(MAX_ANGLE)
}

/// LEDC duty value for `angle`.
pub fn angle_to_duty(angle: u8) -> u32 {
    let duty = angle_to_pulse_us(angle) * (1 << pins::SERVO_PWM_RESOLUTION_BITS) / FRAME_US;
    duty.min(DUTY_MAX)
}
