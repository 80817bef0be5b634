//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`]: the hexagonal boundary for network
//! connectivity.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! The first reconnect after a drop is attempted at once.  Each failure
//! then pushes the next attempt out by an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s), so a missing access point costs one bounded
//! attempt per window instead of one per loop iteration.

use log::{error, info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use crate::app::ports::{ConnectivityError, ConnectivityPort};

const MIN_BACKOFF_MS: u64 = 2_000;
const MAX_BACKOFF_MS: u64 = 60_000;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Backoff
// ───────────────────────────────────────────────────────────────

/// Paces reconnect attempts against the loop's monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectBackoff {
    delay_ms: u64,
    next_attempt_ms: u64,
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconnectBackoff {
    pub fn new() -> Self {
        Self {
            delay_ms: MIN_BACKOFF_MS,
            next_attempt_ms: 0,
        }
    }

    /// `Err(remaining_ms)` while the window is still closed.
    pub fn check(&self, now_ms: u64) -> Result<(), u64> {
        if now_ms >= self.next_attempt_ms {
            Ok(())
        } else {
            Err(self.next_attempt_ms - now_ms)
        }
    }

    pub fn on_failure(&mut self, now_ms: u64) {
        self.next_attempt_ms = now_ms.saturating_add(self.delay_ms);
        self.delay_ms = (self.delay_ms * 2).min(MAX_BACKOFF_MS);
    }

    pub fn on_success(&mut self) {
        *self = Self::new();
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff: ReconnectBackoff,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(target_os = "espidf")]
    started: bool,
    /// Simulation: whether the access point answers.
    #[cfg(not(target_os = "espidf"))]
    sim_ap_reachable: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>) -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff: ReconnectBackoff::new(),
            attempts: 0,
            wifi,
            started: false,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff: ReconnectBackoff::new(),
            attempts: 0,
            sim_ap_reachable: true,
            sim_link_up: false,
        }
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Initial, blocking association at boot.  A failure arms the
    /// reconnect backoff from `now_ms`, same as a failed reconnect.
    pub fn connect(&mut self, now_ms: u64) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.is_connected() {
            return Err(ConnectivityError::AlreadyConnected);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.attempts = self.attempts.wrapping_add(1);
        match self.platform_connect() {
            Ok(()) => {
                self.backoff.on_success();
                info!("WiFi: connected (attempt {})", self.attempts);
                Ok(())
            }
            Err(e) => {
                self.backoff.on_failure(now_ms);
                error!("WiFi: connection failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn backoff(&self) -> ReconnectBackoff {
        self.backoff
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if !self.started {
            let auth_method = if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };
            let cfg = Configuration::Client(ClientConfiguration {
                ssid: self.ssid.clone(),
                password: self.password.clone(),
                auth_method,
                ..Default::default()
            });
            self.wifi.set_configuration(&cfg).map_err(|e| {
                warn!("WiFi: set_configuration failed: {}", e);
                ConnectivityError::ConnectionFailed
            })?;
            self.wifi.start().map_err(|e| {
                warn!("WiFi: start failed: {}", e);
                ConnectivityError::ConnectionFailed
            })?;
            self.started = true;
        }

        // Drop any half-open association before retrying.
        let _ = self.wifi.disconnect();
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed: {}", e);
            ConnectivityError::ConnectionFailed
        })?;
        self.wifi.wait_netif_up().map_err(|e| {
            warn!("WiFi: netif did not come up: {}", e);
            ConnectivityError::ConnectionFailed
        })?;

        if let Ok(ip) = self.wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: IP = {}", ip.ip);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if !self.sim_ap_reachable {
            warn!("WiFi(sim): AP unreachable (attempt {})", self.attempts);
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_link_up = true;
        info!("WiFi(sim): connected to '{}' (attempt {})", self.ssid, self.attempts);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn sim_set_ap_reachable(&mut self, reachable: bool) {
        self.sim_ap_reachable = reachable;
    }

    pub fn sim_drop_link(&mut self) {
        self.sim_link_up = false;
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn reconnect(&mut self, now_ms: u64) -> Result<(), ConnectivityError> {
        if self.is_connected() {
            return Err(ConnectivityError::AlreadyConnected);
        }
        self.backoff
            .check(now_ms)
            .map_err(|retry_in_ms| ConnectivityError::BackingOff { retry_in_ms })?;
        // Missing credentials count as a failed attempt so callers are paced.
        if self.ssid.is_empty() {
            self.backoff.on_failure(now_ms);
            return Err(ConnectivityError::NoCredentials);
        }

        self.attempts = self.attempts.wrapping_add(1);
        info!("WiFi: reconnect attempt {}", self.attempts);
        match self.platform_connect() {
            Ok(()) => {
                self.backoff.on_success();
                info!("WiFi: reconnected");
                Ok(())
            }
            Err(e) => {
                self.backoff.on_failure(now_ms);
                warn!("WiFi: reconnect failed: {} (next in {} ms)", e, self.backoff.check(now_ms).err().unwrap_or(0));
                Err(e)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
