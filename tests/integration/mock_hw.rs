//! Mock adapters for integration tests.
//!
//! Records every actuator call and every store write so tests can assert on
//! the full history without touching real GPIO, PWM or a network.

use std::collections::{HashMap, HashSet, VecDeque};

use terraflow::app::events::AppEvent;
use terraflow::app::ports::{
    AcidityReading, ActuatorPort, ConnectivityError, ConnectivityPort, EventSink, RemoteStorePort, SensorPort,
};
use terraflow::error::NetworkFault;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Valve(u8),
    Pump(bool),
    Alarm(bool),
    Indicator(bool),
}

// ── MockHardware ──────────────────────────────────────────────

/// Distances are served from a queue; once it runs dry the last one repeats.
pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    distances: VecDeque<Option<f32>>,
    last_distance: Option<f32>,
    pub acidity: AcidityReading,
    pub distance_reads: usize,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            distances: VecDeque::new(),
            last_distance: Some(20.0),
            acidity: AcidityReading { ph: 7.0, voltage: 1.535 },
            distance_reads: 0,
        }
    }

    pub fn queue_distance(&mut self, reading: Option<f32>) {
        self.distances.push_back(reading);
    }

    /// Every later read returns `reading`.
    pub fn hold_distance(&mut self, reading: Option<f32>) {
        self.distances.clear();
        self.last_distance = reading;
    }

    pub fn pump_on(&self) -> bool {
        self.last(|c| match c {
            ActuatorCall::Pump(on) => Some(on),
            _ => None,
        })
        .unwrap_or(false)
    }

    pub fn alarm_on(&self) -> bool {
        self.last(|c| match c {
            ActuatorCall::Alarm(on) => Some(on),
            _ => None,
        })
        .unwrap_or(false)
    }

    pub fn valve(&self) -> Option<u8> {
        self.last(|c| match c {
            ActuatorCall::Valve(a) => Some(a),
            _ => None,
        })
    }

    pub fn indicator(&self) -> Option<bool> {
        self.last(|c| match c {
            ActuatorCall::Indicator(on) => Some(on),
            _ => None,
        })
    }

    pub fn count(&self, call: ActuatorCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    fn last<T>(&self, pick: impl Fn(ActuatorCall) -> Option<T>) -> Option<T> {
        self.calls.iter().rev().find_map(|c| pick(*c))
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn measure_distance(&mut self) -> Option<f32> {
        self.distance_reads += 1;
        if let Some(next) = self.distances.pop_front() {
            self.last_distance = next;
        }
        self.last_distance
    }

    fn measure_acidity(&mut self) -> AcidityReading {
        self.acidity
    }
}

impl ActuatorPort for MockHardware {
    fn set_valve(&mut self, angle: u8) {
        self.calls.push(ActuatorCall::Valve(angle));
    }

    fn set_pump(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Pump(on));
    }

    fn set_alarm(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Alarm(on));
    }

    fn set_status_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Indicator(on));
    }
}

// ── MockStore ─────────────────────────────────────────────────

/// In-memory store.  Values are kept as the decoded scalars the domain sees.
pub struct MockStore {
    pub values: HashMap<String, String>,
    /// Every successful write, in order.
    pub puts: Vec<(String, String)>,
    /// Every read, in order.
    pub reads: Vec<String>,
    pub reachable: bool,
    failing: HashSet<String>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            puts: Vec::new(),
            reads: Vec::new(),
            reachable: true,
            failing: HashSet::new(),
        }
    }

    pub fn set(&mut self, path: &str, value: &str) {
        self.values.insert(path.to_string(), value.to_string());
    }

    pub fn fail_path(&mut self, path: &str) {
        self.failing.insert(path.to_string());
    }

    pub fn heal_path(&mut self, path: &str) {
        self.failing.remove(path);
    }

    pub fn value(&self, path: &str) -> Option<&str> {
        self.values.get(path).map(String::as_str)
    }

    /// Values written to `path`, oldest first.
    pub fn writes_to(&self, path: &str) -> Vec<&str> {
        self.puts
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn reads_of(&self, path: &str) -> usize {
        self.reads.iter().filter(|p| *p == path).count()
    }

    pub fn clear_history(&mut self) {
        self.puts.clear();
        self.reads.clear();
    }

    fn reject(&self, path: &str) -> bool {
        !self.reachable || self.failing.contains(path)
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStorePort for MockStore {
    fn put(&mut self, path: &str, value: &str, _timeout_ms: u32, _max_retries: u8) -> Result<(), NetworkFault> {
        if self.reject(path) {
            return Err(NetworkFault::Timeout);
        }
        self.values.insert(path.to_string(), value.to_string());
        self.puts.push((path.to_string(), value.to_string()));
        Ok(())
    }

    fn get(&mut self, path: &str, _timeout_ms: u32) -> Result<Option<String>, NetworkFault> {
        self.reads.push(path.to_string());
        if self.reject(path) {
            return Err(NetworkFault::Timeout);
        }
        Ok(self.values.get(path).cloned())
    }
}

// ── MockNet ───────────────────────────────────────────────────

pub struct MockNet {
    pub connected: bool,
    /// Whether a reconnect attempt succeeds.
    pub ap_reachable: bool,
    pub reconnect_attempts: usize,
}

#[allow(dead_code)]
impl MockNet {
    pub fn online() -> Self {
        Self {
            connected: true,
            ap_reachable: true,
            reconnect_attempts: 0,
        }
    }

    pub fn offline() -> Self {
        Self {
            connected: false,
            ap_reachable: false,
            reconnect_attempts: 0,
        }
    }
}

impl ConnectivityPort for MockNet {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reconnect(&mut self, _now_ms: u64) -> Result<(), ConnectivityError> {
        self.reconnect_attempts += 1;
        if self.ap_reachable {
            self.connected = true;
            Ok(())
        } else {
            Err(ConnectivityError::ConnectionFailed)
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
