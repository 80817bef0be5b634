//! TerraFlow Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink    RtdbStore    WifiAdapter   │
//! │  (Sensor+Actuator)  (EventSink)     (RemoteStore)(Connectivity)│
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Guard · Lockout · Arbiter · Telemetry · Commands      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  MonotonicClock · Watchdog                                     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{error, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use terraflow::adapters::hardware::HardwareAdapter;
use terraflow::adapters::log_sink::LogEventSink;
use terraflow::adapters::rtdb::RtdbStore;
use terraflow::adapters::time::MonotonicClock;
use terraflow::adapters::wifi::WifiAdapter;
use terraflow::app::ports::ConnectivityPort;
use terraflow::app::service::AppService;
use terraflow::config::SystemConfig;
use terraflow::drivers::buzzer::Buzzer;
use terraflow::drivers::delay::SysDelay;
use terraflow::drivers::pump::PumpRelay;
use terraflow::drivers::status_led::StatusLed;
use terraflow::drivers::valve::ValveServo;
use terraflow::drivers::watchdog::Watchdog;
use terraflow::drivers::hw_init;
use terraflow::sensors::SensorHub;

// ── Build-time settings ───────────────────────────────────────

const WIFI_SSID: &str = match option_env!("TERRAFLOW_WIFI_SSID") {
    Some(s) => s,
    None => "",
};
const WIFI_PASSWORD: &str = match option_env!("TERRAFLOW_WIFI_PASSWORD") {
    Some(s) => s,
    None => "",
};
const STORE_HOST: &str = match option_env!("TERRAFLOW_STORE_HOST") {
    Some(s) => s,
    None => "",
};

/// Pause between loop iterations; lets the idle task run.
const LOOP_YIELD_MS: u32 = 10;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TerraFlow v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate().context("built-in configuration")?;

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}; halting", e);
        return Err(e.into());
    }

    let mut hw = HardwareAdapter::new(
        SensorHub::new(&config, SysDelay),
        ValveServo::new(),
        PumpRelay::new(),
        Buzzer::new(),
        StatusLed::new(),
    );

    // ── 3. Network ────────────────────────────────────────────
    let clock = MonotonicClock::new();
    let peripherals = Peripherals::take().context("Peripherals::take")?;
    let sys_loop = EspSystemEventLoop::take().context("event loop")?;
    let nvs = EspDefaultNvsPartition::take().context("nvs")?;
    let driver = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?,
        sys_loop,
    )?;

    let mut wifi = WifiAdapter::new(driver);
    match wifi.set_credentials(WIFI_SSID, WIFI_PASSWORD) {
        Ok(()) => {
            if let Err(e) = wifi.connect(clock.now_ms()) {
                warn!("WiFi: initial connect failed ({}); retrying from the loop", e);
            }
        }
        Err(e) => warn!("WiFi: build-time credentials rejected ({}); running offline", e),
    }

    if STORE_HOST.is_empty() {
        warn!("No store host configured; every remote request will fail");
    }
    let mut store = RtdbStore::new(STORE_HOST);

    // ── 4. App service ────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config).context("app service")?;
    app.start(&mut hw, &mut store, wifi.is_connected(), &mut sink);

    let watchdog = Watchdog::default();
    if !watchdog.is_subscribed() {
        warn!("Running without watchdog supervision");
    }

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        app.run_iteration(clock.now_ms(), &mut hw, &mut store, &mut wifi, &mut sink);
        watchdog.feed();
        FreeRtos::delay_ms(LOOP_YIELD_MS);
    }
}
