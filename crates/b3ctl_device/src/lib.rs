//! # B3 Device Emulator
//!
//! In-memory emulator of the B3 device's HTTP control API.
//!
//! This crate provides:
//! - The playback state machine (`play_pause` / `stop`)
//! - Config key validation and storage
//! - Route dispatch with the device's `{ "status": ... }` envelopes
//! - Failure injection for exercising client error paths
//!
//! ## Usage
//!
//! The emulator speaks raw method/path/body triples, so it can sit behind
//! any transport: a loopback HTTP client in tests, or a real listener.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod handler;
mod playback;
mod server;

pub use config::DeviceConfig;
pub use error::{DeviceError, DeviceResult};
pub use handler::{ActionOutcome, RequestHandler};
pub use playback::{PlaybackMachine, Transition};
pub use server::{DeviceEmulator, DeviceResponse};
