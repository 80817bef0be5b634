//! GPIO / peripheral pin assignments for the TerraFlow station board
//! (ESP32-WROOM-32 DevKit).
//!
//! Single source of truth; every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Ultrasonic level sensor (HC-SR04)
// ---------------------------------------------------------------------------

/// Digital output: 10 µs trigger pulse starts a measurement.
pub const ULTRASONIC_TRIG_GPIO: i32 = 19;
/// Digital input: echo pulse width is proportional to distance.
pub const ULTRASONIC_ECHO_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// pH probe (analog front-end board)
// ---------------------------------------------------------------------------

/// pH probe amplifier output: GPIO 35 is ADC1 channel 7 (input-only pin).
pub const PH_ADC_GPIO: i32 = 35;
pub const PH_ADC1_CHANNEL: u32 = 7;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Relay module for the drain pump.  Active LOW: LOW = pump on.
pub const PUMP_RELAY_GPIO: i32 = 25;
/// Piezo buzzer (alarm).  Active HIGH.
pub const BUZZER_GPIO: i32 = 13;
/// Valve servo signal (LEDC PWM).
pub const VALVE_SERVO_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// Status LED (on-board blue LED)
// ---------------------------------------------------------------------------

/// HIGH = connected to the network.
pub const STATUS_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits) for the servo channel.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Hobby servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Pulse width for 0°.
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Pulse width for 180°.
pub const SERVO_MAX_PULSE_US: u32 = 2_400;
