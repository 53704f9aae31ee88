//! Error types for the device emulator.
//!
//! The display form of each variant is the exact status string the device
//! puts in its response envelope.

use thiserror::Error;

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors the device reports back to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The action list was missing or empty.
    #[error("No actions provided")]
    NoActions,

    /// An action entry had no `action` field.
    #[error("No action provided")]
    MissingAction,

    /// An action entry had no `args` field.
    #[error("No args provided")]
    MissingArgs,

    /// The action is not one the device performs.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A config update carried no keys.
    #[error("no config data")]
    EmptyConfig,

    /// A config update carried a key the device does not know.
    #[error("Invalid config key: {0}")]
    InvalidConfigKey(String),

    /// The request body was not the expected JSON shape.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
