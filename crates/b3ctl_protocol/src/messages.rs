//! Request and response bodies for the device control API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Route for reading and writing the device configuration.
pub const CONFIG_ROUTE: &str = "/api/config";
/// Route for dispatching playback actions.
pub const ACTION_ROUTE: &str = "/api/actions";
/// Route for listing the audio files on the device.
pub const FILE_ROUTE: &str = "/api/audiofiles";

/// Flat mapping of config key to numeric value, as sent by `POST /api/config`.
pub type ConfigUpdate = BTreeMap<String, f64>;

/// A playback command accepted by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Toggle between playing and paused; starts the given track when idle.
    PlayPause,
    /// Stop playback and clear the active track.
    Stop,
}

impl Action {
    /// Returns the wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::PlayPause => "play_pause",
            Action::Stop => "stop",
        }
    }

    /// Parses a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "play_pause" => Some(Action::PlayPause),
            "stop" => Some(Action::Stop),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single action entry in an [`ActionRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCommand {
    /// Wire name of the action.
    pub action: String,
    /// Track name the action applies to.
    pub args: String,
}

impl ActionCommand {
    /// Creates a command for a typed action.
    pub fn new(action: Action, track: impl Into<String>) -> Self {
        Self {
            action: action.as_str().to_string(),
            args: track.into(),
        }
    }
}

/// Body of `POST /api/actions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Actions to perform, in order.
    pub actions: Vec<ActionCommand>,
}

impl ActionRequest {
    /// Creates a request carrying a single action.
    pub fn single(action: Action, track: impl Into<String>) -> Self {
        Self {
            actions: vec![ActionCommand::new(action, track)],
        }
    }
}

/// Playback state reported by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum PlaybackState {
    /// A track is playing (`play_pause`).
    Playing,
    /// A track is paused (`pause`).
    Paused,
    /// Nothing is playing (`stop` or anything unrecognized).
    #[default]
    Idle,
}

impl PlaybackState {
    /// Returns the wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Playing => "play_pause",
            PlaybackState::Paused => "pause",
            PlaybackState::Idle => "stop",
        }
    }
}

impl From<Option<String>> for PlaybackState {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("play_pause") => PlaybackState::Playing,
            Some("pause") => PlaybackState::Paused,
            _ => PlaybackState::Idle,
        }
    }
}

impl From<PlaybackState> for String {
    fn from(state: PlaybackState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A config value as it appears on the wire.
///
/// The device persists its configuration as INI text, so values read back
/// from it are frequently strings rather than numbers. Any other JSON value
/// is kept as [`ConfigValue::Other`] so one bad key does not spoil the rest
/// of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A JSON number.
    Number(f64),
    /// A JSON string, expected to hold a number.
    Text(String),
    /// JSON `null`: the device has no value for this key.
    Missing,
    /// Anything else (booleans, arrays, objects).
    Other(serde_json::Value),
}

impl ConfigValue {
    /// Returns the numeric value, if there is a finite one.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            ConfigValue::Number(n) => *n,
            ConfigValue::Text(s) => s.trim().parse().ok()?,
            ConfigValue::Missing | ConfigValue::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

/// Success payload of `GET /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Every config key the device reported, including device-only keys.
    #[serde(default)]
    pub config: BTreeMap<String, ConfigValue>,
    /// Track currently loaded by the device; empty or null when none.
    #[serde(default)]
    pub activesong: Option<String>,
    /// Playback state.
    #[serde(default)]
    pub state: PlaybackState,
}

impl ConfigSnapshot {
    /// Returns the numeric value for a key, if present and numeric.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.config.get(key).and_then(ConfigValue::as_f64)
    }

    /// Returns the active track, treating an empty name as none.
    pub fn active_song(&self) -> Option<&str> {
        self.activesong.as_deref().filter(|s| !s.is_empty())
    }

    /// Sets a numeric value.
    pub fn with_value(mut self, key: impl Into<String>, value: f64) -> Self {
        self.config.insert(key.into(), ConfigValue::Number(value));
        self
    }

    /// Sets the active track.
    pub fn with_song(mut self, song: impl Into<String>) -> Self {
        self.activesong = Some(song.into());
        self
    }

    /// Sets the playback state.
    pub fn with_state(mut self, state: PlaybackState) -> Self {
        self.state = state;
        self
    }
}

/// Success payload of `GET /api/audiofiles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackList {
    /// File names, sorted case-insensitively by the device.
    pub files: Vec<String>,
}

/// Success payload of routes that return nothing but a status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {}
