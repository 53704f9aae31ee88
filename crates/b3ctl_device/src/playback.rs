//! Playback state machine.
//!
//! ```text
//!   Idle ──play_pause──▶ Playing ──play_pause──▶ Paused
//!    ▲                     │                       │
//!    └──────── stop ───────┴──────── stop ─────────┘
//!                          ◀──────play_pause───────┘
//! ```

use b3ctl_protocol::{Action, PlaybackState};
use tracing::debug;

/// Outcome of a playback action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the action.
    pub from: PlaybackState,
    /// State after the action.
    pub to: PlaybackState,
}

/// Tracks what the device is playing.
#[derive(Debug, Clone, Default)]
pub struct PlaybackMachine {
    state: PlaybackState,
    active_file: Option<String>,
}

impl PlaybackMachine {
    /// Creates an idle machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Returns the track being played or paused.
    pub fn active_file(&self) -> Option<&str> {
        self.active_file.as_deref()
    }

    /// Applies an action.
    pub fn perform(&mut self, action: Action, track: &str) -> Transition {
        let from = self.state;
        match (action, from) {
            (Action::PlayPause, PlaybackState::Playing) => {
                self.state = PlaybackState::Paused;
            }
            (Action::PlayPause, PlaybackState::Idle | PlaybackState::Paused) => {
                self.active_file = Some(track.to_string());
                self.state = PlaybackState::Playing;
            }
            (Action::Stop, _) => {
                self.active_file = Some(String::new());
                self.state = PlaybackState::Idle;
            }
        }
        debug!(%action, %from, to = %self.state, track, "playback transition");
        Transition {
            from,
            to: self.state,
        }
    }
}
