//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns both sensor drivers and is what the hardware adapter
//! forwards [`SensorPort`](crate::app::ports::SensorPort) calls to.

pub mod acidity;
pub mod ultrasonic;

use embedded_hal::delay::DelayNs;

use crate::app::ports::AcidityReading;
use crate::config::SystemConfig;
use acidity::AciditySensor;
use ultrasonic::UltrasonicSensor;

pub struct SensorHub<D: DelayNs + Clone> {
    pub level: UltrasonicSensor<D>,
    pub acidity: AciditySensor<D>,
}

impl<D: DelayNs + Clone> SensorHub<D> {
    pub fn new(config: &SystemConfig, delay: D) -> Self {
        Self {
            level: UltrasonicSensor::new(delay.clone()),
            acidity: AciditySensor::new(config, delay),
        }
    }

    pub fn distance_cm(&mut self) -> Option<f32> {
        self.level.measure()
    }

    pub fn acidity(&mut self) -> AcidityReading {
        self.acidity.read()
    }
}
