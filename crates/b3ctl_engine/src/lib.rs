//! # B3 Control Engine
//!
//! State synchronization engine for the B3 device control panel.
//!
//! This crate provides:
//! - Slider position ↔ physical value transform (linear and log-scale)
//! - Edit masking for controls under direct manipulation
//! - Typed gateway to the device's JSON API (HTTP transport abstraction)
//! - Bounded, newest-first event log
//! - The sync engine: timer-driven polling plus immediate push of edits
//!
//! ## Architecture
//!
//! The engine follows a **poll-and-push** model:
//! 1. Every tick, pull the full device configuration (the device is
//!    authoritative)
//! 2. Render it, skipping controls the user is dragging
//! 3. Push the full local configuration whenever the user commits an edit
//!
//! ## Key Invariants
//!
//! - A masked control is never overwritten from server data
//! - Snapshots are applied whole; a failed poll changes nothing
//! - A poll result older than one already applied is discarded
//! - No operation fails outward: every error becomes a log entry

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod http;
mod log;
mod mask;
mod presentation;
mod transform;
mod transport;

pub use config::{PanelConfig, DEFAULT_BASE_URL};
pub use engine::{EngineStats, SyncEngine};
pub use error::{PanelError, PanelResult};
pub use http::{
    HttpClient, HttpMethod, HttpResponse, HttpTransport, LoopbackClient, LoopbackServer,
    ReqwestClient,
};
pub use log::{EventLog, LogEntry, LogStatus};
pub use mask::EditMaskRegistry;
pub use presentation::{PresentationSink, RecordingSink, SinkEvent};
pub use transform::{format_value, to_normalized, to_physical, LogScale};
pub use transport::{MockTransport, PanelTransport};
