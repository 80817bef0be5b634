//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  The
//! `Telemetry` line is the station's console status line.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::state::{AlarmState, PumpState};

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn pump_label(p: PumpState) -> &'static str {
    match p {
        PumpState::Idle => "ready",
        PumpState::Running { .. } => "ON",
        PumpState::Locked => "locked",
    }
}

fn alarm_label(a: AlarmState) -> &'static str {
    match a {
        AlarmState::Idle => "ready",
        AlarmState::Active { .. } => "ON",
        AlarmState::Locked => "locked",
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let level = match t.distance_cm {
                    Some(cm) if !t.sensor_fault => format!("{:.1}cm", cm),
                    Some(cm) => format!("FAULT (last {:.1}cm)", cm),
                    None => "--".to_string(),
                };
                info!(
                    "TELEM | mode={} | level={} | pH={:.2} ({:.3}V) | valve={}\u{00b0} | \
                     pump={} | alarm={}",
                    t.mode.as_str(),
                    level,
                    t.acidity_ph,
                    t.acidity_voltage,
                    t.valve_angle,
                    pump_label(t.pump),
                    alarm_label(t.alarm),
                );
            }
            AppEvent::PumpChanged { from, to } => {
                info!("PUMP  | {} -> {}", pump_label(*from), pump_label(*to));
            }
            AppEvent::AlarmChanged { from, to } => {
                info!("ALARM | {} -> {}", alarm_label(*from), alarm_label(*to));
            }
            AppEvent::ValveMoved { from, to } => {
                info!("VALVE | {}\u{00b0} -> {}\u{00b0}", from, to);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {} -> {}", from.as_str(), to.as_str());
            }
            AppEvent::SensorFault { consecutive, escalated: false } => {
                warn!("SENSE | distance read failed ({} in a row)", consecutive);
            }
            AppEvent::SensorFault { consecutive, escalated: true } => {
                error!("SENSE | distance sensor failed ({} in a row), level treated as critical", consecutive);
            }
            AppEvent::SensorRecovered => {
                info!("SENSE | distance sensor recovered");
            }
            AppEvent::ConnectivityChanged { connected } => {
                if *connected {
                    info!("NET   | connected");
                } else {
                    warn!("NET   | connection lost");
                }
            }
            AppEvent::Started(mode) => {
                info!("START | mode={}", mode.as_str());
            }
        }
    }
}
