//! Terminal presentation sink.

use crate::commands::describe_state;
use b3ctl_engine::{LogEntry, LogStatus, PresentationSink};
use b3ctl_protocol::{Control, PlaybackState};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Prints engine updates as lines of text.
///
/// Control values are printed only when their text changes, so a steady
/// poll stays quiet.
pub struct TerminalSink {
    controls: bool,
    shown: Mutex<HashMap<&'static str, String>>,
    playback: Mutex<Option<PlaybackState>>,
    track: Mutex<Option<String>>,
}

impl TerminalSink {
    /// Creates a sink that prints everything.
    pub fn new() -> Self {
        Self::with_controls(true)
    }

    /// Creates a sink that prints only log entries.
    pub fn log_only() -> Self {
        Self::with_controls(false)
    }

    fn with_controls(controls: bool) -> Self {
        Self {
            controls,
            shown: Mutex::new(HashMap::new()),
            playback: Mutex::new(None),
            track: Mutex::new(None),
        }
    }

    /// Forgets what has been printed, so the next update of every control
    /// is shown again.
    pub fn reset(&self) {
        self.shown.lock().clear();
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for TerminalSink {
    fn set_control_value(&self, control: &Control, _position: f64, text: &str) {
        if !self.controls {
            return;
        }
        let previous = self.shown.lock().insert(control.id, text.to_string());
        if previous.as_deref() != Some(text) {
            println!("  {:<24} {}", control.label, text);
        }
    }

    fn set_track_options(&self, names: &[String]) {
        if !self.controls {
            return;
        }
        println!("tracks:");
        for name in names {
            println!("  {name}");
        }
    }

    fn set_selected_track(&self, name: &str) {
        if !self.controls {
            return;
        }
        let mut track = self.track.lock();
        if track.as_deref() != Some(name) {
            println!("track: {name}");
            *track = Some(name.to_string());
        }
    }

    fn set_playback_indicator(&self, state: PlaybackState) {
        if !self.controls {
            return;
        }
        let mut playback = self.playback.lock();
        if *playback != Some(state) {
            println!("state: {}", describe_state(state));
            *playback = Some(state);
        }
    }

    fn append_log_entry(&self, entry: &LogEntry) {
        match entry.status {
            LogStatus::Ok => println!("[{}] {entry}", entry.status),
            LogStatus::Error => eprintln!("[{}] {entry}", entry.status),
        }
    }
}
