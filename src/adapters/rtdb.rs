//! Realtime-database REST adapter.
//!
//! Implements [`RemoteStorePort`] against a Firebase-style realtime
//! database: every store path maps to `{host}{path}.json`, `PUT` writes a
//! JSON scalar there, `GET` reads it back.  A missing key reads as `null`.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: raw `esp_http_client` calls, one short
//!   request per operation, TLS via the ESP-IDF certificate bundle.
//! - **all other targets**: an in-memory map, so the full loop can run
//!   on the host.

use log::debug;

#[cfg(target_os = "espidf")]
use std::ffi::CString;
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::RemoteStorePort;
use crate::error::NetworkFault;

/// Largest response body we read.  Scalars are a handful of bytes.
#[cfg(target_os = "espidf")]
const MAX_BODY: usize = 128;

/// Request URL for a store path.
pub fn url_for(host: &str, path: &str) -> Result<String, NetworkFault> {
    if host.is_empty() || !path.starts_with('/') || path.contains(['?', '#', ' ']) {
        return Err(NetworkFault::InvalidRequest);
    }
    Ok(format!("{}{}.json", host.trim_end_matches('/'), path))
}

/// Response body to the textual scalar the domain expects.
///
/// `null` and empty bodies mean "no value".  JSON strings lose their
/// quotes; numbers and booleans keep their JSON spelling.  Anything that
/// is not valid JSON is passed through trimmed.
pub fn decode_scalar(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Null) => None,
        Ok(serde_json::Value::String(s)) if s.is_empty() => None,
        Ok(serde_json::Value::String(s)) => Some(s),
        Ok(serde_json::Value::Number(n)) => Some(n.to_string()),
        Ok(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Ok(_) | Err(_) => Some(body.to_string()),
    }
}

pub struct RtdbStore {
    host: String,
    #[cfg(not(target_os = "espidf"))]
    sim: std::collections::HashMap<String, String>,
    #[cfg(not(target_os = "espidf"))]
    sim_reachable: bool,
}

impl RtdbStore {
    /// `host` is the database base URL, e.g. `https://example.firebaseio.com`.
    pub fn new(host: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            #[cfg(not(target_os = "espidf"))]
            sim: std::collections::HashMap::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_reachable: true,
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn put_once(&mut self, path: &str, value: &str, timeout_ms: u32) -> Result<(), NetworkFault> {
        let (status, _) = self.request(esp_http_client_method_t_HTTP_METHOD_PUT, path, Some(value), timeout_ms)?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(NetworkFault::Status(status))
        }
    }

    #[cfg(target_os = "espidf")]
    fn get_once(&mut self, path: &str, timeout_ms: u32) -> Result<Option<String>, NetworkFault> {
        let (status, body) = self.request(esp_http_client_method_t_HTTP_METHOD_GET, path, None, timeout_ms)?;
        if status == 200 {
            Ok(decode_scalar(&body))
        } else {
            Err(NetworkFault::Status(status))
        }
    }

    #[cfg(target_os = "espidf")]
    fn request(
        &self,
        method: esp_http_client_method_t,
        path: &str,
        body: Option<&str>,
        timeout_ms: u32,
    ) -> Result<(u16, String), NetworkFault> {
        let url = CString::new(url_for(&self.host, path)?).map_err(|_| NetworkFault::InvalidRequest)?;

        // SAFETY: the config is plain C data, zero-initialised like the C
        // API expects; `url` outlives the client, which is always cleaned up.
        unsafe {
            let mut cfg: esp_http_client_config_t = core::mem::zeroed();
            cfg.url = url.as_ptr();
            cfg.method = method;
            cfg.timeout_ms = timeout_ms as i32;
            if self.host.starts_with("https://") {
                cfg.transport_type = esp_http_client_transport_t_HTTP_TRANSPORT_OVER_SSL;
                cfg.crt_bundle_attach = Some(esp_crt_bundle_attach);
            }

            let client = esp_http_client_init(&cfg);
            if client.is_null() {
                return Err(NetworkFault::InvalidRequest);
            }
            let result = exchange(client, body.unwrap_or(""));
            esp_http_client_cleanup(client);
            result
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn put_once(&mut self, path: &str, value: &str, _timeout_ms: u32) -> Result<(), NetworkFault> {
        url_for(&self.host, path)?;
        if !self.sim_reachable {
            return Err(NetworkFault::Timeout);
        }
        self.sim.insert(path.to_string(), value.to_string());
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn get_once(&mut self, path: &str, _timeout_ms: u32) -> Result<Option<String>, NetworkFault> {
        url_for(&self.host, path)?;
        if !self.sim_reachable {
            return Err(NetworkFault::Timeout);
        }
        Ok(self.sim.get(path).and_then(|raw| decode_scalar(raw)))
    }
}

#[cfg(not(target_os = "espidf"))]
impl RtdbStore {
    pub fn sim_set_reachable(&mut self, reachable: bool) {
        self.sim_reachable = reachable;
    }

    /// Raw JSON text last written at `path`.
    pub fn sim_raw(&self, path: &str) -> Option<&str> {
        self.sim.get(path).map(String::as_str)
    }
}

/// Open, send, read status and body, close.
///
/// SAFETY: `client` must be a live handle from `esp_http_client_init`.
#[cfg(target_os = "espidf")]
unsafe fn exchange(client: esp_http_client_handle_t, body: &str) -> Result<(u16, String), NetworkFault> {
    let rc = unsafe { esp_http_client_open(client, body.len() as i32) };
    if rc != ESP_OK as i32 {
        return Err(map_rc(rc));
    }

    let result = (|| {
        if !body.is_empty() {
            let written = unsafe { esp_http_client_write(client, body.as_ptr().cast(), body.len() as i32) };
            if written < 0 || written as usize != body.len() {
                return Err(NetworkFault::Transport(written));
            }
        }

        let len = unsafe { esp_http_client_fetch_headers(client) };
        if len < 0 {
            return Err(map_rc(len as i32));
        }
        let status = unsafe { esp_http_client_get_status_code(client) };

        let mut buf = [0u8; MAX_BODY];
        let n = unsafe { esp_http_client_read_response(client, buf.as_mut_ptr().cast(), buf.len() as i32) };
        let text = if n > 0 {
            core::str::from_utf8(&buf[..n as usize]).unwrap_or("").to_string()
        } else {
            String::new()
        };
        Ok((status.clamp(0, i32::from(u16::MAX)) as u16, text))
    })();

    unsafe { esp_http_client_close(client) };
    result
}

#[cfg(target_os = "espidf")]
fn map_rc(rc: i32) -> NetworkFault {
    if rc == ESP_ERR_TIMEOUT as i32 || rc == ESP_ERR_HTTP_EAGAIN as i32 {
        NetworkFault::Timeout
    } else {
        NetworkFault::Transport(rc)
    }
}

// ───────────────────────────────────────────────────────────────
// RemoteStorePort
// ───────────────────────────────────────────────────────────────

impl RemoteStorePort for RtdbStore {
    fn put(&mut self, path: &str, value: &str, timeout_ms: u32, max_retries: u8) -> Result<(), NetworkFault> {
        let mut last = NetworkFault::Timeout;
        for attempt in 0..=max_retries {
            match self.put_once(path, value, timeout_ms) {
                Ok(()) => return Ok(()),
                // A malformed request will not get better on retry.
                Err(NetworkFault::InvalidRequest) => return Err(NetworkFault::InvalidRequest),
                Err(e) => {
                    debug!("RTDB: PUT {} attempt {} failed: {}", path, attempt + 1, e);
                    last = e;
                }
            }
        }
        Err(last)
    }

    fn get(&mut self, path: &str, timeout_ms: u32) -> Result<Option<String>, NetworkFault> {
        self.get_once(path, timeout_ms)
    }
}
