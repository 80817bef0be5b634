//! Remote store synchronisation.
//!
//! [`telemetry`] pushes readings and actuator edges up to the store;
//! [`commands`] polls the operator's mode and override values back down.
//! Both speak only to [`RemoteStorePort`](crate::app::ports::RemoteStorePort)
//! and never fail the control loop: every fault is logged and dropped.

pub mod commands;
pub mod paths;
pub mod telemetry;
