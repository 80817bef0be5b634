//! Distance sensor fault guard.
//!
//! The guard runs **every control tick before the lockout controller** and
//! turns a raw echo reading into a [`DistanceInput`], or nothing at all.
//!
//! ## Fault lifecycle
//!
//! 1. A read fails (no echo, or a non-positive / non-finite distance).
//! 2. The guard counts it.  Below the limit the tick is skipped and the
//!    last valid distance stays in `DeviceState`.
//! 3. At the limit the guard escalates: every further failed read yields
//!    [`DistanceInput::SensorFailed`], which the controller treats as a
//!    critical level.
//! 4. The first valid reading resets the count and clears the escalation.

use log::{error, info, warn};

use crate::control::lockout::DistanceInput;
use crate::error::SensorFault;

/// What the control tick should do with this reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardVerdict {
    /// Feed this input to the controller.
    Evaluate(DistanceInput),
    /// Transient failure: skip the tick, keep the last valid distance.
    Skip(SensorFault),
}

pub struct SensorFaultGuard {
    max_consecutive: u8,
    consecutive: u8,
}

impl SensorFaultGuard {
    pub fn new(max_consecutive: u8) -> Self {
        Self {
            max_consecutive: max_consecutive.max(1),
            consecutive: 0,
        }
    }

    /// Classify one raw reading.
    pub fn filter(&mut self, raw: Option<f32>) -> GuardVerdict {
        let fault = match raw {
            Some(cm) if cm.is_finite() && cm > 0.0 => {
                if self.is_escalated() {
                    info!("Distance sensor recovered ({:.1} cm)", cm);
                }
                self.consecutive = 0;
                return GuardVerdict::Evaluate(DistanceInput::Measured(cm));
            }
            Some(_) => SensorFault::OutOfRange,
            None => SensorFault::NoEcho,
        };

        let was_escalated = self.is_escalated();
        self.consecutive = self.consecutive.saturating_add(1);

        if self.is_escalated() {
            if !was_escalated {
                error!(
                    "Distance sensor failed {} times in a row; treating level as critical",
                    self.consecutive
                );
            }
            GuardVerdict::Evaluate(DistanceInput::SensorFailed)
        } else {
            warn!(
                "Distance read failed: {} ({}/{})",
                fault, self.consecutive, self.max_consecutive
            );
            GuardVerdict::Skip(fault)
        }
    }

    /// Consecutive failed reads so far.
    pub fn consecutive_faults(&self) -> u8 {
        self.consecutive
    }

    /// True once the consecutive-failure limit has been reached.
    pub fn is_escalated(&self) -> bool {
        self.consecutive >= self.max_consecutive
    }
}
