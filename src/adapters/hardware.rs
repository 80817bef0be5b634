//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{AcidityReading, ActuatorPort, SensorPort};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::pump::PumpRelay;
use crate::drivers::status_led::StatusLed;
use crate::drivers::valve::ValveServo;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D: DelayNs + Clone> {
    sensor_hub: SensorHub<D>,
    valve: ValveServo,
    pump: PumpRelay,
    buzzer: Buzzer,
    led: StatusLed,
}

impl<D: DelayNs + Clone> HardwareAdapter<D> {
    pub fn new(
        sensor_hub: SensorHub<D>,
        valve: ValveServo,
        pump: PumpRelay,
        buzzer: Buzzer,
        led: StatusLed,
    ) -> Self {
        Self {
            sensor_hub,
            valve,
            pump,
            buzzer,
            led,
        }
    }

    /// Last commanded valve angle.
    pub fn valve_angle(&self) -> Option<u8> {
        self.valve.angle()
    }

    pub fn pump_running(&self) -> bool {
        self.pump.is_running()
    }

    pub fn alarm_sounding(&self) -> bool {
        self.buzzer.is_sounding()
    }

    pub fn indicator_lit(&self) -> bool {
        self.led.is_lit()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D: DelayNs + Clone> SensorPort for HardwareAdapter<D> {
    fn measure_distance(&mut self) -> Option<f32> {
        self.sensor_hub.distance_cm()
    }

    fn measure_acidity(&mut self) -> AcidityReading {
        self.sensor_hub.acidity()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<D: DelayNs + Clone> ActuatorPort for HardwareAdapter<D> {
    fn set_valve(&mut self, angle: u8) {
        self.valve.set_angle(angle);
    }

    fn set_pump(&mut self, on: bool) {
        self.pump.set(on);
    }

    fn set_alarm(&mut self, on: bool) {
        self.buzzer.set(on);
    }

    fn set_status_indicator(&mut self, on: bool) {
        self.led.set(on);
    }
}
