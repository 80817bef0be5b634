//! Analog pH probe driver.
//!
//! The probe's amplifier board outputs a voltage that falls linearly as pH
//! rises.  Each reading averages several 12-bit ADC conversions spaced
//! 10 ms apart, converts to volts against the 3.3 V reference, then applies
//! the linear calibration `pH = slope · V + offset`.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH7 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::app::ports::AcidityReading;
use crate::config::SystemConfig;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

/// Raw value for ~1.535 V, which the default calibration puts at pH 7.
static SIM_PH_RAW: AtomicU16 = AtomicU16::new(1_905);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ph_raw(raw: u16) {
    SIM_PH_RAW.store(raw, Ordering::Relaxed);
}

const ADC_FULL_SCALE: f32 = 4095.0;
const ADC_VREF: f32 = 3.3;
const SAMPLE_SPACING_MS: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    pub slope: f32,
    pub offset: f32,
}

impl Calibration {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            slope: config.ph_slope,
            offset: config.ph_offset,
        }
    }

    pub fn ph(&self, voltage: f32) -> f32 {
        self.slope * voltage + self.offset
    }
}

/// Average raw count to probe voltage.
pub fn raw_to_voltage(avg_raw: f32) -> f32 {
    avg_raw / ADC_FULL_SCALE * ADC_VREF
}

pub struct AciditySensor<D: DelayNs> {
    cal: Calibration,
    samples: u8,
    delay: D,
    last: AcidityReading,
}

impl<D: DelayNs> AciditySensor<D> {
    pub fn new(config: &SystemConfig, delay: D) -> Self {
        Self {
            cal: Calibration::from_config(config),
            samples: config.ph_samples.max(1),
            delay,
            last: AcidityReading::default(),
        }
    }

    /// Averaged reading.  Conversions that fail are left out of the
    /// average; if all of them fail the previous reading is returned.
    pub fn read(&mut self) -> AcidityReading {
        let mut sum: u32 = 0;
        let mut good: u32 = 0;
        for i in 0..self.samples {
            if i > 0 {
                self.delay.delay_ms(SAMPLE_SPACING_MS);
            }
            if let Some(raw) = self.read_adc() {
                sum += u32::from(raw);
                good += 1;
            }
        }

        if good == 0 {
            warn!("pH: every ADC conversion failed, keeping {:.2}", self.last.ph);
            return self.last;
        }

        let voltage = raw_to_voltage(sum as f32 / good as f32);
        self.last = AcidityReading {
            ph: self.cal.ph(voltage),
            voltage,
        };
        self.last
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        hw_init::adc1_read(pins::PH_ADC1_CHANNEL)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        Some(SIM_PH_RAW.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voltage_from_raw() {
        assert!((raw_to_voltage(4095.0) - 3.3).abs() < 1e-5);
        assert!((raw_to_voltage(0.0)).abs() < 1e-6);
        assert!((raw_to_voltage(1905.0) - 1.5352).abs() < 1e-3);
    }

    #[test]
    fn default_calibration_line() {
        let cal = Calibration::from_config(&SystemConfig::default());
        assert!((cal.ph(0.0) - 15.75).abs() < 1e-4);
        assert!((cal.ph(1.535) - 7.0).abs() < 0.01);
        // Higher voltage is more acidic.
        assert!(cal.ph(2.0) < cal.ph(1.0));
    }
}
