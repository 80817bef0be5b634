//! Actuation decisions: the one-shot lockout state machine and the
//! auto / manual arbitration on top of it.

pub mod arbiter;
pub mod lockout;
