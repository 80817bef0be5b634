//! Telemetry push: device state → remote store.
//!
//! Runs once per control tick, plus an edge-only pass when a pump run ends
//! between ticks.  Readings are deadband-filtered against the
//! last value the store actually accepted; actuator positions are pushed
//! on edges only; the heartbeat timestamp goes up every time.  Every push
//! is independent, so one failed field never holds back the others.

use core::fmt::{self, Write};

use heapless::String;
use log::{debug, warn};

use super::paths;
use crate::app::ports::RemoteStorePort;
use crate::app::state::{DeviceState, Mode};
use crate::config::SystemConfig;

/// Longest scalar we ever format (a u64 millisecond timestamp).
const SCALAR_CAP: usize = 24;

/// Push bookkeeping for one call to [`TelemetrySync::report`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryReport {
    pub pushed: u8,
    pub failed: u8,
}

/// Actuator values seen on the previous tick.  Edges are detected against
/// these regardless of whether the previous push made it to the store.
#[derive(Debug, Clone, Copy, Default)]
struct Committed {
    valve_angle: Option<u8>,
    pump_on: Option<bool>,
    sensor_fault: bool,
}

pub struct TelemetrySync {
    distance_deadband_cm: f32,
    acidity_deadband_ph: f32,
    timeout_ms: u32,
    push_retries: u8,
    edge_retries: u8,
    committed: Committed,
}

impl TelemetrySync {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            distance_deadband_cm: config.distance_deadband_cm,
            acidity_deadband_ph: config.acidity_deadband_ph,
            timeout_ms: config.network_timeout_ms,
            push_retries: config.push_retries,
            edge_retries: config.edge_push_retries,
            committed: Committed::default(),
        }
    }

    /// Startup announcement: device online, running in `mode`.
    pub fn announce<S: RemoteStorePort>(&self, mode: Mode, store: &mut S) -> TelemetryReport {
        let mut report = TelemetryReport::default();
        self.push(store, paths::DEVICE_STATUS, format_args!("1"), self.push_retries, &mut report);
        self.push(
            store,
            paths::DEVICE_MODE,
            format_args!("\"{}\"", mode.as_str()),
            self.push_retries,
            &mut report,
        );
        report
    }

    /// Push this tick's changes.  `state.last_reported` advances only for
    /// fields the store accepted.
    pub fn report<S: RemoteStorePort>(
        &mut self,
        state: &mut DeviceState,
        now_ms: u64,
        store: &mut S,
    ) -> TelemetryReport {
        let mut report = TelemetryReport::default();
        let retries = self.push_retries;

        // Level
        if let Some(cm) = state.distance {
            if exceeds_deadband(state.last_reported.distance, cm, self.distance_deadband_cm)
                && self.push(store, paths::DISTANCE, format_args!("{:.1}", cm), retries, &mut report)
            {
                state.last_reported.distance = Some(cm);
            }
        }

        // Acidity, with its probe voltage riding along
        let ph = state.acidity;
        if exceeds_deadband(state.last_reported.acidity, ph, self.acidity_deadband_ph) {
            if self.push(store, paths::ACIDITY, format_args!("{:.2}", ph), retries, &mut report) {
                state.last_reported.acidity = Some(ph);
            }
            self.push(
                store,
                paths::ACIDITY_VOLTAGE,
                format_args!("{:.3}", state.acidity_voltage),
                retries,
                &mut report,
            );
        }

        self.push_edges(state, store, &mut report);

        // Heartbeat
        self.push(store, paths::DEVICE_TIMESTAMP, format_args!("{}", now_ms), retries, &mut report);

        debug!("Telemetry: {} pushed, {} failed", report.pushed, report.failed);
        report
    }

    /// Push actuator edges only.  Used when a run ends between control
    /// ticks so the store sees the pump stop without waiting a tick.
    pub fn report_edges<S: RemoteStorePort>(&mut self, state: &mut DeviceState, store: &mut S) -> TelemetryReport {
        let mut report = TelemetryReport::default();
        self.push_edges(state, store, &mut report);
        report
    }

    fn push_edges<S: RemoteStorePort>(&mut self, state: &mut DeviceState, store: &mut S, report: &mut TelemetryReport) {
        let angle = state.valve_angle;
        if self.committed.valve_angle != Some(angle) {
            if self.push(store, paths::VALVE, format_args!("{}", angle), self.edge_retries, report) {
                state.last_reported.valve_angle = Some(angle);
            }
            self.committed.valve_angle = Some(angle);
        }

        let pump_on = state.pump.is_on();
        if self.committed.pump_on != Some(pump_on) {
            if self.push(
                store,
                paths::PUMP,
                format_args!("{}", u8::from(pump_on)),
                self.edge_retries,
                report,
            ) {
                state.last_reported.pump_on = Some(pump_on);
            }
            self.committed.pump_on = Some(pump_on);
        }

        if self.committed.sensor_fault != state.sensor_fault {
            self.push(
                store,
                paths::DEVICE_SENSOR_FAULT,
                format_args!("{}", u8::from(state.sensor_fault)),
                self.edge_retries,
                report,
            );
            self.committed.sensor_fault = state.sensor_fault;
        }
    }

    fn push<S: RemoteStorePort>(
        &self,
        store: &mut S,
        path: &str,
        value: fmt::Arguments<'_>,
        retries: u8,
        report: &mut TelemetryReport,
    ) -> bool {
        let mut buf: String<SCALAR_CAP> = String::new();
        if buf.write_fmt(value).is_err() {
            warn!("Telemetry: value for {} does not fit, dropped", path);
            report.failed = report.failed.saturating_add(1);
            return false;
        }

        match store.put(path, &buf, self.timeout_ms, retries) {
            Ok(()) => {
                report.pushed = report.pushed.saturating_add(1);
                true
            }
            Err(e) => {
                warn!("Telemetry: push {} = {} failed: {}", path, buf, e);
                report.failed = report.failed.saturating_add(1);
                false
            }
        }
    }
}

/// Strictly greater than the deadband, or never reported.
fn exceeds_deadband(last: Option<f32>, current: f32, band: f32) -> bool {
    last.map_or(true, |prev| (current - prev).abs() > band)
}
