//! Configuration for the control panel engine.

use crate::transform::LogScale;
use std::time::Duration;

/// Default device address: the device serves its API on port 5000.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Configuration for a control panel session.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Base URL of the device API (e.g., "http://b3.local:5000").
    pub base_url: String,
    /// Period of the config poll.
    pub poll_interval: Duration,
    /// Maximum number of entries kept in the event log.
    pub max_log_entries: usize,
    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,
    /// Decade bounds for log-scale controls.
    pub scale: LogScale,
}

impl PanelConfig {
    /// Creates a new panel configuration.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            poll_interval: Duration::from_secs(1),
            max_log_entries: 5,
            request_timeout: Duration::from_secs(10),
            scale: LogScale::AUDIO,
        }
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the event log capacity.
    pub fn with_max_log_entries(mut self, max: usize) -> Self {
        self.max_log_entries = max;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the log-scale bounds.
    pub fn with_scale(mut self, scale: LogScale) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_config_defaults() {
        let config = PanelConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.max_log_entries, 5);
        assert_eq!(config.scale, LogScale::AUDIO);
    }

    #[test]
    fn panel_config_builder() {
        let config = PanelConfig::new("http://b3.local:5000")
            .with_poll_interval(Duration::from_millis(250))
            .with_max_log_entries(20)
            .with_request_timeout(Duration::from_secs(2))
            .with_scale(LogScale::from_hz(10.0, 10_000.0));

        assert_eq!(config.base_url, "http://b3.local:5000");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.max_log_entries, 20);
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert!((config.scale.lower - 1.0).abs() < 1e-12);
        assert!((config.scale.upper - 4.0).abs() < 1e-12);
    }
}
