//! Emulator configuration.

use b3ctl_protocol::{
    BODY_THRESHOLD, BUFFER_COUNT, CHUNK_SIZE_MS, DEVICE_CONFIG_KEYS, FLIP_INTERVAL_MS, HPF_CUTOFF,
    LPF_CUTOFF, MOUTH_THRESHOLD, RMS_WINDOW_MS, SEEK_TIME,
};
use std::collections::BTreeMap;

/// Configuration for a [`DeviceEmulator`](crate::DeviceEmulator).
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Audio files available for playback.
    pub tracks: Vec<String>,
    /// Initial contents of the device configuration file.
    pub values: BTreeMap<String, f64>,
    /// Config keys accepted on top of the standard ones.
    pub extra_keys: Vec<String>,
    /// Serve config values as strings, the way the INI-backed device does.
    pub ini_values: bool,
}

impl DeviceConfig {
    /// Creates a configuration with the given tracks and factory values.
    pub fn new<I, S>(tracks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tracks: tracks.into_iter().map(Into::into).collect(),
            values: factory_values(),
            extra_keys: Vec::new(),
            ini_values: false,
        }
    }

    /// Sets an initial config value.
    pub fn with_value(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Removes an initial config value, leaving the key unset.
    pub fn without_value(mut self, key: &str) -> Self {
        self.values.remove(key);
        self
    }

    /// Accepts an additional config key.
    pub fn with_extra_key(mut self, key: impl Into<String>) -> Self {
        self.extra_keys.push(key.into());
        self
    }

    /// Returns true if the device accepts `key` in a config update.
    pub fn allows_key(&self, key: &str) -> bool {
        DEVICE_CONFIG_KEYS.contains(&key) || self.extra_keys.iter().any(|k| k == key)
    }

    /// Serves config values as strings.
    pub fn with_ini_values(mut self, ini_values: bool) -> Self {
        self.ini_values = ini_values;
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

/// Values a freshly installed device starts with.
fn factory_values() -> BTreeMap<String, f64> {
    [
        (LPF_CUTOFF, 4000.0),
        (HPF_CUTOFF, 100.0),
        (BODY_THRESHOLD, 0.1),
        (MOUTH_THRESHOLD, 0.05),
        (CHUNK_SIZE_MS, 20.0),
        (BUFFER_COUNT, 4.0),
        (SEEK_TIME, 0.0),
        (RMS_WINDOW_MS, 50.0),
        (FLIP_INTERVAL_MS, 100.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
