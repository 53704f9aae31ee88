//! Error types for the control panel engine.

use thiserror::Error;

/// Result type for panel operations.
pub type PanelResult<T> = Result<T, PanelError>;

/// Errors that can occur while synchronizing with the device.
///
/// None of these are fatal: the engine turns every one of them into an
/// `Error` log entry and carries on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    /// Network failure or non-2xx HTTP status.
    #[error("{endpoint}: {message}")]
    Transport {
        /// Route or component the failure came from.
        endpoint: String,
        /// Error message.
        message: String,
    },

    /// The device answered with a status other than `"success"`.
    #[error("{endpoint}: {message}")]
    Application {
        /// Route that answered.
        endpoint: String,
        /// The status string reported by the device.
        message: String,
    },

    /// The response violated the envelope contract or was malformed.
    #[error("{endpoint}: {message}")]
    Protocol {
        /// Route that answered.
        endpoint: String,
        /// Description of the violation.
        message: String,
    },

    /// A log-scale transform was given a value it cannot take the log of.
    #[error("invalid value {value} for a log-scale control")]
    InvalidValue {
        /// The offending value.
        value: f64,
    },

    /// An edit gesture ended without having started.
    #[error("unexpected state: {0}")]
    UnexpectedState(String),

    /// A push was attempted before every control had a known value.
    #[error("config not loaded yet: {0}")]
    NotLoaded(String),

    /// A control that is not part of the panel's control table.
    #[error("unknown control: {0}")]
    UnknownControl(String),
}

impl PanelError {
    /// Creates a transport error.
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates an application error.
    pub fn application(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Application {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    pub fn protocol(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Returns true for failures reported by or on the way to the device.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            PanelError::Transport { .. }
                | PanelError::Application { .. }
                | PanelError::Protocol { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors() {
        assert!(PanelError::transport("/api/config", "HTTP 500").is_remote());
        assert!(PanelError::application("/api/config", "no config data").is_remote());
        assert!(PanelError::protocol("/api/config", "(no status)").is_remote());
        assert!(!PanelError::InvalidValue { value: 0.0 }.is_remote());
        assert!(!PanelError::UnexpectedState("slider masking".into()).is_remote());
        assert!(!PanelError::NotLoaded("lpf_cutoff".into()).is_remote());
    }

    #[test]
    fn error_display() {
        let err = PanelError::transport("/api/actions", "HTTP 502");
        assert_eq!(err.to_string(), "/api/actions: HTTP 502");

        let err = PanelError::protocol("/api/config", "(no status)");
        assert_eq!(err.to_string(), "/api/config: (no status)");

        let err = PanelError::NotLoaded("lpf_cutoff, hpf_cutoff".into());
        assert_eq!(err.to_string(), "config not loaded yet: lpf_cutoff, hpf_cutoff");

        let err = PanelError::InvalidValue { value: -3.0 };
        assert!(err.to_string().contains("-3"));
    }
}
