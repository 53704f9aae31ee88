//! The rendering side of the panel, as seen by the engine.

use crate::log::LogEntry;
use b3ctl_protocol::{Control, PlaybackState};
use parking_lot::Mutex;

/// Receives display updates from the engine.
///
/// The engine only calls into the sink and never holds its own state lock
/// while doing so, so implementations may call back into the engine (for
/// example when setting the selected track fires a change event).
pub trait PresentationSink: Send + Sync {
    /// Shows a control's slider position and its physical value label.
    fn set_control_value(&self, control: &Control, position: f64, text: &str);

    /// Replaces the list of selectable tracks.
    fn set_track_options(&self, names: &[String]);

    /// Shows a track as selected.
    fn set_selected_track(&self, name: &str);

    /// Shows the playback state.
    fn set_playback_indicator(&self, state: PlaybackState);

    /// Shows a new log entry.
    fn append_log_entry(&self, entry: &LogEntry);
}

/// A call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// `set_control_value`.
    ControlValue {
        /// Control identifier.
        id: &'static str,
        /// Slider position.
        position: f64,
        /// Label text.
        text: String,
    },
    /// `set_track_options`.
    TrackOptions(Vec<String>),
    /// `set_selected_track`.
    SelectedTrack(String),
    /// `set_playback_indicator`.
    Playback(PlaybackState),
    /// `append_log_entry`.
    Log(LogEntry),
}

type TrackHook = Box<dyn Fn(&str) + Send + Sync>;

/// A sink that records every call, for tests and headless use.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
    track_hook: Mutex<Option<TrackHook>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a callback fired after `set_selected_track`, the way a
    /// selector widget fires its change event.
    pub fn on_track_selected(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.track_hook.lock() = Some(Box::new(hook));
    }

    /// Returns all recorded events, oldest first.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Forgets all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Returns the last position and label shown for a control.
    pub fn control_value(&self, control_id: &str) -> Option<(f64, String)> {
        self.events.lock().iter().rev().find_map(|e| match e {
            SinkEvent::ControlValue { id, position, text } if *id == control_id => {
                Some((*position, text.clone()))
            }
            _ => None,
        })
    }

    /// Returns the number of updates shown for a control.
    pub fn control_updates(&self, control_id: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, SinkEvent::ControlValue { id, .. } if *id == control_id))
            .count()
    }

    /// Returns the last selected track shown.
    pub fn selected_track(&self) -> Option<String> {
        self.events.lock().iter().rev().find_map(|e| match e {
            SinkEvent::SelectedTrack(name) => Some(name.clone()),
            _ => None,
        })
    }

    /// Returns the last track list shown.
    pub fn track_options(&self) -> Option<Vec<String>> {
        self.events.lock().iter().rev().find_map(|e| match e {
            SinkEvent::TrackOptions(names) => Some(names.clone()),
            _ => None,
        })
    }

    /// Returns the last playback state shown.
    pub fn playback(&self) -> Option<PlaybackState> {
        self.events.lock().iter().rev().find_map(|e| match e {
            SinkEvent::Playback(state) => Some(*state),
            _ => None,
        })
    }

    /// Returns every log entry shown, oldest first.
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Log(entry) => Some(entry.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SinkEvent) {
        self.events.lock().push(event);
    }
}

impl PresentationSink for RecordingSink {
    fn set_control_value(&self, control: &Control, position: f64, text: &str) {
        self.record(SinkEvent::ControlValue {
            id: control.id,
            position,
            text: text.to_string(),
        });
    }

    fn set_track_options(&self, names: &[String]) {
        self.record(SinkEvent::TrackOptions(names.to_vec()));
    }

    fn set_selected_track(&self, name: &str) {
        self.record(SinkEvent::SelectedTrack(name.to_string()));
        if let Some(hook) = self.track_hook.lock().as_ref() {
            hook(name);
        }
    }

    fn set_playback_indicator(&self, state: PlaybackState) {
        self.record(SinkEvent::Playback(state));
    }

    fn append_log_entry(&self, entry: &LogEntry) {
        self.record(SinkEvent::Log(entry.clone()));
    }
}
