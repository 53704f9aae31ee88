//! Transport layer abstraction for device communication.

use crate::error::{PanelError, PanelResult};
use async_trait::async_trait;
use b3ctl_protocol::{Action, ConfigSnapshot, ConfigUpdate, CONFIG_ROUTE, FILE_ROUTE};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A panel transport handles communication with the device.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-process loopback, mock for testing, etc.).
/// Every failure comes back as a [`PanelError`]; nothing panics across it.
#[async_trait]
pub trait PanelTransport: Send + Sync {
    /// Reads the full device configuration.
    async fn fetch_config(&self) -> PanelResult<ConfigSnapshot>;

    /// Writes the full locally-known configuration.
    async fn push_config(&self, config: &ConfigUpdate) -> PanelResult<()>;

    /// Dispatches a playback action for a track.
    async fn dispatch_action(&self, action: Action, track: &str) -> PanelResult<()>;

    /// Lists the audio files on the device.
    async fn fetch_tracks(&self) -> PanelResult<Vec<String>>;
}

/// A scripted transport for testing.
///
/// Config responses are served from a queue; once it is empty the default
/// response (if any) is served on every fetch.
#[derive(Debug, Default)]
pub struct MockTransport {
    config_queue: Mutex<VecDeque<PanelResult<ConfigSnapshot>>>,
    default_config: Mutex<Option<ConfigSnapshot>>,
    tracks: Mutex<Option<PanelResult<Vec<String>>>>,
    push_error: Mutex<Option<PanelError>>,
    action_error: Mutex<Option<PanelError>>,
    pushed: Mutex<Vec<ConfigUpdate>>,
    actions: Mutex<Vec<(Action, String)>>,
    action_gate: Mutex<Option<Arc<Notify>>>,
    fetches: AtomicUsize,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the config served when the queue is empty.
    pub fn set_config_response(&self, snapshot: ConfigSnapshot) {
        *self.default_config.lock() = Some(snapshot);
    }

    /// Queues a one-off config response.
    pub fn queue_config_response(&self, response: PanelResult<ConfigSnapshot>) {
        self.config_queue.lock().push_back(response);
    }

    /// Sets the track list response.
    pub fn set_tracks_response(&self, response: PanelResult<Vec<String>>) {
        *self.tracks.lock() = Some(response);
    }

    /// Makes every push fail with `error`, or succeed with `None`.
    pub fn set_push_error(&self, error: Option<PanelError>) {
        *self.push_error.lock() = error;
    }

    /// Makes every action fail with `error`, or succeed with `None`.
    pub fn set_action_error(&self, error: Option<PanelError>) {
        *self.action_error.lock() = error;
    }

    /// Holds every later action until the returned gate is notified once
    /// per action.
    pub fn hold_actions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.action_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Returns every config pushed so far.
    pub fn pushed(&self) -> Vec<ConfigUpdate> {
        self.pushed.lock().clone()
    }

    /// Returns every action dispatched so far.
    pub fn actions(&self) -> Vec<(Action, String)> {
        self.actions.lock().clone()
    }

    /// Returns the number of config fetches so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PanelTransport for MockTransport {
    async fn fetch_config(&self) -> PanelResult<ConfigSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(response) = self.config_queue.lock().pop_front() {
            return response;
        }
        self.default_config
            .lock()
            .clone()
            .ok_or_else(|| PanelError::protocol(CONFIG_ROUTE, "no mock config response set"))
    }

    async fn push_config(&self, config: &ConfigUpdate) -> PanelResult<()> {
        if let Some(error) = self.push_error.lock().clone() {
            return Err(error);
        }
        self.pushed.lock().push(config.clone());
        Ok(())
    }

    async fn dispatch_action(&self, action: Action, track: &str) -> PanelResult<()> {
        let gate = self.action_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(error) = self.action_error.lock().clone() {
            return Err(error);
        }
        self.actions.lock().push((action, track.to_string()));
        Ok(())
    }

    async fn fetch_tracks(&self) -> PanelResult<Vec<String>> {
        self.tracks
            .lock()
            .clone()
            .unwrap_or_else(|| Err(PanelError::protocol(FILE_ROUTE, "no mock track response set")))
    }
}
