//! Mode arbitration between the lockout controller and the operator.
//!
//! In `Auto` the [`LockoutController`] decides.  In `Manual` it is not
//! evaluated, so its lockout bookkeeping stays frozen; only the timed
//! expiry keeps running, which is what ends a manually started pump run.

use log::info;

use super::lockout::{ActuatorTargets, DistanceInput, LockoutController};
use crate::app::state::{DeviceState, Mode, PumpState};

#[derive(Debug, Default)]
pub struct ModeArbiter;

impl ModeArbiter {
    pub fn new() -> Self {
        Self
    }

    /// Compute this tick's actuator targets according to `state.mode`.
    pub fn arbitrate(
        &self,
        lockout: &LockoutController,
        state: &mut DeviceState,
        distance: DistanceInput,
        now: u64,
    ) -> ActuatorTargets {
        match state.mode {
            Mode::Auto => lockout.evaluate(state, distance, now),
            Mode::Manual => {
                lockout.expire(state, now);
                self.apply_override(state, now)
            }
        }
    }

    fn apply_override(&self, state: &mut DeviceState, now: u64) -> ActuatorTargets {
        let wanted = state.manual_override;

        if let Some(target) = wanted.valve_target {
            let target = target.min(180);
            if target != state.valve_angle {
                info!("Manual: valve {} -> {}", state.valve_angle, target);
                state.valve_angle = target;
            }
        }

        // Same one-shot guard as automatic control: only from Idle.
        if wanted.pump_requested && state.pump == PumpState::Idle {
            state.pump = PumpState::Running { started_at: now };
            info!("Manual: pump ON");
        }

        ActuatorTargets::from_state(state)
    }
}
