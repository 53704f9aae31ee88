//! The device emulator.

use crate::config::DeviceConfig;
use crate::handler::RequestHandler;
use b3ctl_protocol::{
    encode_status, encode_success, Ack, ConfigValue, PlaybackState, ACTION_ROUTE, CONFIG_ROUTE,
    FILE_ROUTE, STATUS_SUCCESS,
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// A raw HTTP response produced by the emulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl DeviceResponse {
    /// A `200 OK` response with a JSON body.
    pub fn ok(body: Vec<u8>) -> Self {
        Self { status: 200, body }
    }

    /// A response with a plain-text reason as its body.
    pub fn error(status: u16, reason: &str) -> Self {
        Self {
            status,
            body: reason.as_bytes().to_vec(),
        }
    }
}

/// In-memory stand-in for the B3 device's HTTP API.
///
/// Answers the config, action and audio-file routes with the same envelopes
/// as the real device, without producing any audio.
///
/// # Example
///
/// ```
/// use b3ctl_device::{DeviceConfig, DeviceEmulator};
///
/// let device = DeviceEmulator::new(DeviceConfig::new(["intro.mp3"]));
/// let response = device.handle("GET", "/api/audiofiles", b"");
/// assert_eq!(response.status, 200);
/// ```
pub struct DeviceEmulator {
    handler: RequestHandler,
    failures: RwLock<HashMap<String, u16>>,
    requests: AtomicU64,
}

impl DeviceEmulator {
    /// Creates an emulator.
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            handler: RequestHandler::new(config),
            failures: RwLock::new(HashMap::new()),
            requests: AtomicU64::new(0),
        }
    }

    /// Handles one HTTP request.
    pub fn handle(&self, method: &str, path: &str, body: &[u8]) -> DeviceResponse {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let route = path.split('?').next().unwrap_or(path);
        debug!(method, route, "device request");

        if let Some(status) = self.failures.read().get(route) {
            return DeviceResponse::error(*status, "Injected failure");
        }

        match (method, route) {
            ("GET", CONFIG_ROUTE) => reply(&self.handler.handle_get_config()),
            ("POST", CONFIG_ROUTE) => match parse_body(body) {
                Some(body) => match self.handler.handle_update_config(&body) {
                    Ok(()) => reply(&Ack {}),
                    Err(e) => DeviceResponse::ok(encode_status(&e.to_string())),
                },
                None => DeviceResponse::error(400, "Bad Request"),
            },
            ("POST", ACTION_ROUTE) => match parse_body(body) {
                Some(body) => self.actions(&body),
                None => DeviceResponse::error(400, "Bad Request"),
            },
            ("GET", FILE_ROUTE) => reply(&self.handler.handle_list_files()),
            (_, CONFIG_ROUTE | ACTION_ROUTE | FILE_ROUTE) => {
                DeviceResponse::error(405, "Method Not Allowed")
            }
            _ => DeviceResponse::error(404, "Not Found"),
        }
    }

    /// Makes every request to `route` fail with `status` until cleared.
    pub fn fail_route(&self, route: &str, status: u16) {
        self.failures.write().insert(route.to_string(), status);
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        self.failures.write().clear();
    }

    /// Marks the playing track as finished; the next config read stops it.
    pub fn end_track(&self) {
        self.handler.end_track();
    }

    /// Returns the playback state.
    pub fn playback(&self) -> PlaybackState {
        self.handler.playback()
    }

    /// Returns the active track.
    pub fn active_song(&self) -> Option<String> {
        self.handler.active_file().filter(|s| !s.is_empty())
    }

    /// Returns the numeric value stored for a config key.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.handler.value(key).as_ref().and_then(ConfigValue::as_f64)
    }

    /// Returns the number of requests handled.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn actions(&self, body: &Value) -> DeviceResponse {
        match self.handler.handle_actions(body) {
            Ok(outcome) => {
                let status = match outcome.result {
                    Ok(()) => STATUS_SUCCESS.to_string(),
                    Err(e) => e.to_string(),
                };
                let body = json!({ "action": outcome.action, "status": status });
                DeviceResponse::ok(body.to_string().into_bytes())
            }
            Err(e) => DeviceResponse::ok(encode_status(&e.to_string())),
        }
    }
}

impl Default for DeviceEmulator {
    fn default() -> Self {
        Self::new(DeviceConfig::default())
    }
}

fn parse_body(body: &[u8]) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

fn reply<T: Serialize>(payload: &T) -> DeviceResponse {
    match encode_success(payload) {
        Ok(body) => DeviceResponse::ok(body),
        Err(e) => DeviceResponse::ok(encode_status(&e.to_string())),
    }
}
