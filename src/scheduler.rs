//! Cooperative cadence scheduler.
//!
//! The main loop reads the monotonic clock once per iteration and asks the
//! scheduler which periodic tasks are due.  Nothing here sleeps; the loop
//! decides how long to yield between iterations.
//!
//! Two cadences run side by side:
//!
//! | Task          | Default period | Work                              |
//! |---------------|----------------|-----------------------------------|
//! | `Control`     | 2500 ms        | sense, decide, actuate, telemetry |
//! | `CommandPoll` | 2000 ms        | read mode and manual override     |
//!
//! When both fall due in the same iteration, `Control` runs first.

use heapless::Vec;
use log::debug;

use crate::config::SystemConfig;

// ═══════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════

/// A periodic task the loop knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopTask {
    Control,
    CommandPoll,
}

/// One fixed-period timer.
///
/// Fires once `period_ms` has elapsed since it last fired (or since boot).
/// A late iteration does not cause catch-up bursts: the next deadline is
/// measured from the time it actually fired.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    period_ms: u64,
    last_ms: u64,
}

impl Cadence {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last_ms: 0,
        }
    }

    /// True (and re-armed) when the period has elapsed at `now_ms`.
    pub fn due(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) >= self.period_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct Scheduler {
    control: Cadence,
    command_poll: Cadence,
}

impl Scheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            control: Cadence::new(config.control_interval_ms),
            command_poll: Cadence::new(config.command_poll_interval_ms),
        }
    }

    /// Tasks due at `now_ms`, in execution order.
    pub fn poll(&mut self, now_ms: u64) -> Vec<LoopTask, 2> {
        let mut due = Vec::new();
        // Capacity is exactly the number of tasks, so pushes cannot fail.
        if self.control.due(now_ms) {
            let _ = due.push(LoopTask::Control);
        }
        if self.command_poll.due(now_ms) {
            let _ = due.push(LoopTask::CommandPoll);
        }
        if !due.is_empty() {
            debug!("Scheduler: {:?} due at {} ms", due.as_slice(), now_ms);
        }
        due
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
