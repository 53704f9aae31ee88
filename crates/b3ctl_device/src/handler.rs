//! Request handlers for the device routes.

use crate::config::DeviceConfig;
use crate::error::{DeviceError, DeviceResult};
use crate::playback::PlaybackMachine;
use b3ctl_protocol::{Action, ConfigSnapshot, ConfigValue, PlaybackState, TrackList, SEEK_TIME};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Mutable device state.
#[derive(Debug)]
struct DeviceState {
    values: BTreeMap<String, ConfigValue>,
    playback: PlaybackMachine,
    track_ended: bool,
}

/// Outcome of an action request: the last action's name and its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Wire name of the last action processed, if it had one.
    pub action: Option<String>,
    /// Result of the last action processed.
    pub result: DeviceResult<()>,
}

/// Handler for device requests.
pub struct RequestHandler {
    config: DeviceConfig,
    state: RwLock<DeviceState>,
}

impl RequestHandler {
    /// Creates a handler with the given configuration.
    pub fn new(config: DeviceConfig) -> Self {
        let values = config
            .values
            .iter()
            .map(|(k, v)| (k.clone(), ConfigValue::Number(*v)))
            .collect();
        Self {
            config,
            state: RwLock::new(DeviceState {
                values,
                playback: PlaybackMachine::new(),
                track_ended: false,
            }),
        }
    }

    /// Handles `GET /api/config`.
    ///
    /// A track that finished on its own is stopped first.
    pub fn handle_get_config(&self) -> ConfigSnapshot {
        let mut state = self.state.write();
        if state.track_ended {
            state.track_ended = false;
            if state.playback.state() == PlaybackState::Playing {
                debug!("track finished, stopping");
                Self::perform(&mut state, Action::Stop, "");
            }
        }

        let config = state
            .values
            .iter()
            .map(|(key, value)| (key.clone(), self.present(value)))
            .collect();
        ConfigSnapshot {
            config,
            activesong: state.playback.active_file().map(str::to_string),
            state: state.playback.state(),
        }
    }

    /// Handles `POST /api/config`.
    ///
    /// Every key is validated before any is written, so a rejected update
    /// leaves the configuration untouched.
    pub fn handle_update_config(&self, body: &Value) -> DeviceResult<()> {
        let update = body
            .as_object()
            .ok_or_else(|| DeviceError::InvalidRequest("config body must be an object".into()))?;
        if update.is_empty() {
            return Err(DeviceError::EmptyConfig);
        }
        if let Some(key) = update.keys().find(|k| !self.config.allows_key(k)) {
            return Err(DeviceError::InvalidConfigKey(key.clone()));
        }

        let values = update
            .iter()
            .map(|(key, value)| {
                serde_json::from_value::<ConfigValue>(value.clone())
                    .map(|v| (key.clone(), v))
                    .map_err(|_| DeviceError::InvalidRequest(format!("bad value for {key}")))
            })
            .collect::<DeviceResult<Vec<_>>>()?;

        let mut state = self.state.write();
        for (key, value) in values {
            debug!(%key, ?value, "config updated");
            state.values.insert(key, value);
        }
        Ok(())
    }

    /// Handles `POST /api/actions`.
    ///
    /// Actions run in order. A failing action does not stop the ones after
    /// it; the reply reports the last one.
    pub fn handle_actions(&self, body: &Value) -> DeviceResult<ActionOutcome> {
        let actions = match body.get("actions").and_then(Value::as_array) {
            Some(actions) if !actions.is_empty() => actions,
            _ => return Err(DeviceError::NoActions),
        };

        let mut state = self.state.write();
        let mut outcome = ActionOutcome {
            action: None,
            result: Ok(()),
        };
        for entry in actions {
            let name = entry.get("action").and_then(Value::as_str);
            outcome = ActionOutcome {
                action: name.map(str::to_string),
                result: Self::apply_action(&mut state, entry.as_object(), name),
            };
        }
        Ok(outcome)
    }

    /// Handles `GET /api/audiofiles`.
    pub fn handle_list_files(&self) -> TrackList {
        let mut files = self.config.tracks.clone();
        files.sort_by_key(|name| name.to_lowercase());
        TrackList { files }
    }

    /// Marks the playing track as finished.
    pub fn end_track(&self) {
        self.state.write().track_ended = true;
    }

    /// Returns the playback state.
    pub fn playback(&self) -> PlaybackState {
        self.state.read().playback.state()
    }

    /// Returns the active track, empty once stopped.
    pub fn active_file(&self) -> Option<String> {
        self.state.read().playback.active_file().map(str::to_string)
    }

    /// Returns a stored config value.
    pub fn value(&self, key: &str) -> Option<ConfigValue> {
        self.state.read().values.get(key).cloned()
    }

    fn apply_action(
        state: &mut DeviceState,
        entry: Option<&Map<String, Value>>,
        name: Option<&str>,
    ) -> DeviceResult<()> {
        let entry = entry.ok_or(DeviceError::MissingAction)?;
        if !entry.contains_key("action") {
            return Err(DeviceError::MissingAction);
        }
        let args = entry.get("args").ok_or(DeviceError::MissingArgs)?;
        let name = name.unwrap_or_default();
        let action = Action::parse(name).ok_or_else(|| DeviceError::InvalidAction(name.into()))?;
        Self::perform(state, action, args.as_str().unwrap_or_default());
        Ok(())
    }

    fn perform(state: &mut DeviceState, action: Action, track: &str) {
        let transition = state.playback.perform(action, track);
        if action == Action::Stop && transition.from == PlaybackState::Paused {
            state
                .values
                .insert(SEEK_TIME.to_string(), ConfigValue::Number(0.0));
        }
    }

    fn present(&self, value: &ConfigValue) -> ConfigValue {
        match value {
            ConfigValue::Number(n) if self.config.ini_values => ConfigValue::Text(n.to_string()),
            other => other.clone(),
        }
    }
}
