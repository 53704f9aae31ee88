//! # B3 Control Protocol
//!
//! Wire types for the B3 device's JSON control API.
//!
//! This crate provides:
//! - The fixed table of tunable [`Control`]s and their device config keys
//! - Request and response bodies for the config, action and track routes
//! - The `{ "status": ... }` response [`Envelope`] shared by every route
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod controls;
mod envelope;
mod messages;

pub use controls::{
    control_by_id, control_by_key, lookup_control, Control, BODY_THRESHOLD, BUFFER_COUNT,
    CHUNK_SIZE_MS, CONTROLS, CONTROL_COUNT, DEVICE_CONFIG_KEYS, FLIP_INTERVAL_MS, HPF_CUTOFF,
    LPF_CUTOFF, MOUTH_THRESHOLD, RMS_WINDOW_MS, SEEK_TIME,
};
pub use envelope::{encode_status, encode_success, Envelope, STATUS_SUCCESS};
pub use messages::{
    Ack, Action, ActionCommand, ActionRequest, ConfigSnapshot, ConfigUpdate, ConfigValue,
    PlaybackState, TrackList, ACTION_ROUTE, CONFIG_ROUTE, FILE_ROUTE,
};
