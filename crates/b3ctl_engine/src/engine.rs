//! The panel's synchronization loop.

use crate::config::PanelConfig;
use crate::error::{PanelError, PanelResult};
use crate::log::{EventLog, LogEntry};
use crate::mask::EditMaskRegistry;
use crate::presentation::PresentationSink;
use crate::transform::format_value;
use crate::transport::PanelTransport;
use b3ctl_protocol::{
    Action, ConfigSnapshot, ConfigUpdate, Control, PlaybackState, CONFIG_ROUTE, CONTROLS,
    CONTROL_COUNT,
};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Counters describing the engine's activity.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Polls started.
    pub polls_issued: u64,
    /// Polls whose snapshot was applied.
    pub polls_applied: u64,
    /// Polls discarded because a newer one had already been applied.
    pub polls_discarded: u64,
    /// Polls that failed.
    pub polls_failed: u64,
    /// Successful config pushes.
    pub configs_pushed: u64,
    /// Successful action dispatches.
    pub actions_sent: u64,
    /// Errors reported by or on the way to the device.
    pub remote_errors: u64,
    /// Errors raised locally (bad input, unmatched gestures, early pushes).
    pub local_errors: u64,
    /// Time the last snapshot was applied.
    pub last_applied_at: Option<Instant>,
}

/// Everything the engine knows locally, guarded by one lock.
struct PanelState {
    /// Slider position per control, in `CONTROLS` order.
    positions: [f64; CONTROL_COUNT],
    /// Whether each position came from the device or the user.
    known: [bool; CONTROL_COUNT],
    selected_track: Option<String>,
    /// User track changes whose stop has not completed yet.
    pending_selections: usize,
    tracks: Vec<String>,
    playback: PlaybackState,
    masks: EditMaskRegistry,
    log: EventLog,
    /// Sequence number of the last applied poll.
    last_applied: u64,
    stats: EngineStats,
}

/// The sync engine reconciles local panel state with the device.
///
/// It polls the device configuration on a timer and renders it through the
/// [`PresentationSink`], skipping controls the user is currently dragging.
/// Local edits are pushed to the device as soon as they are committed. Every
/// failure ends up in the event log; no method returns an error.
pub struct SyncEngine<T: PanelTransport, S: PresentationSink> {
    config: PanelConfig,
    transport: Arc<T>,
    sink: Arc<S>,
    state: Mutex<PanelState>,
    /// Set while the engine itself updates the track selector.
    suppress_reload: AtomicBool,
    /// Sequence number of the last issued poll.
    issued: AtomicU64,
}

impl<T: PanelTransport, S: PresentationSink> SyncEngine<T, S> {
    /// Creates a new sync engine.
    pub fn new(config: PanelConfig, transport: T, sink: S) -> Self {
        Self::with_shared(config, Arc::new(transport), Arc::new(sink))
    }

    /// Creates a sync engine over a shared transport and sink.
    pub fn with_shared(config: PanelConfig, transport: Arc<T>, sink: Arc<S>) -> Self {
        let log = EventLog::new(config.max_log_entries);
        Self {
            config,
            transport,
            sink,
            state: Mutex::new(PanelState {
                positions: [0.0; CONTROL_COUNT],
                known: [false; CONTROL_COUNT],
                selected_track: None,
                pending_selections: 0,
                tracks: Vec::new(),
                playback: PlaybackState::Idle,
                masks: EditMaskRegistry::new(),
                log,
                last_applied: 0,
                stats: EngineStats::default(),
            }),
            suppress_reload: AtomicBool::new(false),
            issued: AtomicU64::new(0),
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Gets the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Gets the presentation sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Gets the current stats.
    pub fn stats(&self) -> EngineStats {
        let state = self.state.lock();
        EngineStats {
            polls_issued: self.issued.load(Ordering::SeqCst),
            ..state.stats.clone()
        }
    }

    /// Gets a control's slider position.
    pub fn position(&self, control: &Control) -> PanelResult<f64> {
        let slot = slot(control)?;
        Ok(self.state.lock().positions[slot])
    }

    /// Gets a control's physical value, as it would be pushed.
    pub fn physical_value(&self, control: &Control) -> PanelResult<f64> {
        let position = self.position(control)?;
        Ok(self.config.scale.to_physical(position, control.log_scale))
    }

    /// Returns the full locally-known configuration.
    pub fn local_config(&self) -> ConfigUpdate {
        let positions = self.state.lock().positions;
        CONTROLS
            .iter()
            .zip(positions)
            .map(|(control, position)| {
                let value = self.config.scale.to_physical(position, control.log_scale);
                (control.key.to_string(), value)
            })
            .collect()
    }

    /// Gets the selected track.
    pub fn selected_track(&self) -> Option<String> {
        self.state.lock().selected_track.clone()
    }

    /// Gets the last loaded track list.
    pub fn tracks(&self) -> Vec<String> {
        self.state.lock().tracks.clone()
    }

    /// Gets the last reported playback state.
    pub fn playback(&self) -> PlaybackState {
        self.state.lock().playback
    }

    /// Returns the event log, newest first.
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.state.lock().log.iter().cloned().collect()
    }

    /// Returns true if the control is being edited.
    pub fn is_masked(&self, control: &Control) -> bool {
        self.state.lock().masks.is_masked(control)
    }

    // =========================================================================
    // Gestures and edits
    // =========================================================================

    /// Starts an edit gesture (touch-start) on a control.
    pub fn begin_edit(&self, control: &Control) {
        self.state.lock().masks.begin_edit(control);
        debug!(control = control.id, "edit started");
    }

    /// Ends an edit gesture (touch-end) on a control.
    ///
    /// An end without a matching start is logged as an error.
    pub fn end_edit(&self, control: &Control) {
        let result = self.state.lock().masks.end_edit(control);
        match result {
            Ok(()) => debug!(control = control.id, "edit ended"),
            Err(e) => self.report_error(&e),
        }
    }

    /// Moves a slider without committing it (the live `input` event).
    pub fn preview_edit(&self, control: &Control, position: f64) {
        if let Err(e) = self.set_position(control, position) {
            self.report_error(&e);
        }
    }

    /// Commits a slider value (the `change` event) and pushes the config.
    pub async fn commit_edit(&self, control: &Control, position: f64) {
        if let Err(e) = self.set_position(control, position) {
            self.report_error(&e);
            return;
        }
        self.push_config().await;
    }

    fn set_position(&self, control: &Control, position: f64) -> PanelResult<()> {
        if !position.is_finite() {
            return Err(PanelError::InvalidValue { value: position });
        }
        let position = if control.log_scale {
            position.clamp(0.0, 1.0)
        } else {
            position
        };
        let slot = slot(control)?;
        {
            let mut state = self.state.lock();
            state.positions[slot] = position;
            state.known[slot] = true;
        }
        self.render_control(control, position);
        Ok(())
    }

    /// Returns true once every control has a value from the device or the
    /// user.
    pub fn is_loaded(&self) -> bool {
        self.state.lock().known.iter().all(|known| *known)
    }

    /// Pushes the full locally-known configuration to the device.
    ///
    /// The device replaces its whole configuration on every push, so nothing
    /// is sent until each control holds a real value.
    pub async fn push_config(&self) {
        let unknown = {
            let state = self.state.lock();
            CONTROLS
                .iter()
                .zip(state.known)
                .filter(|(_, known)| !known)
                .map(|(control, _)| control.key)
                .collect::<Vec<_>>()
        };
        if !unknown.is_empty() {
            self.report_error(&PanelError::NotLoaded(unknown.join(", ")));
            return;
        }

        let update = self.local_config();
        match self.transport.push_config(&update).await {
            Ok(()) => {
                self.state.lock().stats.configs_pushed += 1;
                self.report_ok("Sent config OK");
            }
            Err(e) => self.report_error(&e),
        }
    }

    /// Re-renders every control label from local state.
    pub fn refresh_labels(&self) {
        let positions = self.state.lock().positions;
        for (control, position) in CONTROLS.iter().zip(positions) {
            self.render_control(control, position);
        }
    }

    fn render_control(&self, control: &Control, position: f64) {
        let value = self.config.scale.to_physical(position, control.log_scale);
        self.sink
            .set_control_value(control, position, &format_value(value));
    }

    // =========================================================================
    // Tracks and actions
    // =========================================================================

    /// Loads the track list, renders it, then polls once.
    pub async fn load_tracks(&self) {
        match self.transport.fetch_tracks().await {
            Ok(tracks) => {
                self.sink.set_track_options(&tracks);
                let count = tracks.len();
                {
                    let mut state = self.state.lock();
                    if state.selected_track.is_none() {
                        state.selected_track = tracks.first().cloned();
                    }
                    state.tracks = tracks;
                }
                self.report_ok(format!("Received {count} songs"));
                self.poll().await;
            }
            Err(e) => self.report_error(&e),
        }
    }

    /// Records a track selection made in the selector.
    ///
    /// Returns true if the selection came from the user and playback should
    /// therefore be stopped; false while the engine itself is reconciling
    /// the selector with the device.
    pub fn note_track_selected(&self, name: &str) -> bool {
        self.state.lock().selected_track = Some(name.to_string());
        !self.suppress_reload.load(Ordering::SeqCst)
    }

    /// Selects a track on behalf of the user, stopping the current one.
    ///
    /// Until the stop completes, polls leave the selection alone: the device
    /// still reports the old track as active.
    pub async fn select_track(&self, name: &str) {
        if !self.note_track_selected(name) {
            return;
        }
        let _pending = PendingSelection::new(&self.state);
        self.dispatch_action(Action::Stop).await;
    }

    /// Dispatches an action for the selected track, then polls.
    pub async fn dispatch_action(&self, action: Action) {
        let track = self.selected_track().unwrap_or_default();
        match self.transport.dispatch_action(action, &track).await {
            Ok(()) => {
                self.state.lock().stats.actions_sent += 1;
                info!(%action, %track, "action dispatched");
                self.report_ok(format!("Sent action {action}"));
                self.poll().await;
            }
            Err(e) => self.report_error(&e),
        }
    }

    /// Toggles playback of the selected track.
    pub async fn play_pause(&self) {
        self.dispatch_action(Action::PlayPause).await;
    }

    /// Stops playback.
    pub async fn stop(&self) {
        self.dispatch_action(Action::Stop).await;
    }

    // =========================================================================
    // Polling
    // =========================================================================

    /// Fetches the device configuration and applies it.
    pub async fn poll(&self) {
        let seq = self.begin_poll();
        let result = self.transport.fetch_config().await;
        self.finish_poll(seq, result);
    }

    /// Issues a poll sequence number.
    pub fn begin_poll(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies the outcome of poll `seq`.
    ///
    /// A snapshot is applied only if no later-issued poll has been applied
    /// already. Failures are reported and leave the display untouched.
    pub fn finish_poll(&self, seq: u64, result: PanelResult<ConfigSnapshot>) {
        match result {
            Ok(snapshot) => self.apply_snapshot(seq, &snapshot),
            Err(e) => {
                self.state.lock().stats.polls_failed += 1;
                self.report_error(&e);
            }
        }
    }

    fn apply_snapshot(&self, seq: u64, snapshot: &ConfigSnapshot) {
        {
            let mut state = self.state.lock();
            if seq <= state.last_applied {
                state.stats.polls_discarded += 1;
                debug!(seq, last_applied = state.last_applied, "discarding stale poll");
                return;
            }
            state.last_applied = seq;
            state.playback = snapshot.state;
            state.stats.polls_applied += 1;
            state.stats.last_applied_at = Some(Instant::now());
        }

        self.sink.set_playback_indicator(snapshot.state);

        if let Some(song) = snapshot.active_song() {
            if self.adopt_active_song(song) {
                self.suppress_reload.store(true, Ordering::SeqCst);
                self.sink.set_selected_track(song);
                self.suppress_reload.store(false, Ordering::SeqCst);
            } else {
                debug!(song, "track change pending, keeping selection");
            }
        }

        self.apply_values(snapshot);
    }

    /// Takes the device's active song as the selection, unless a user track
    /// change is still in flight.
    fn adopt_active_song(&self, song: &str) -> bool {
        let mut state = self.state.lock();
        if state.pending_selections > 0 {
            return false;
        }
        state.selected_track = Some(song.to_string());
        true
    }

    fn apply_values(&self, snapshot: &ConfigSnapshot) {
        let mut updated = Vec::new();
        let mut errors = Vec::new();
        {
            let mut state = self.state.lock();
            for (slot, control) in CONTROLS.iter().enumerate() {
                if state.masks.is_masked(control) {
                    continue;
                }
                let Some(value) = snapshot.value(control.key) else {
                    errors.push(PanelError::protocol(
                        CONFIG_ROUTE,
                        format!("Key {} missing from config response", control.key),
                    ));
                    continue;
                };
                match self.config.scale.to_normalized(value, control.log_scale) {
                    Ok(position) => {
                        state.positions[slot] = position;
                        state.known[slot] = true;
                        updated.push((control, position));
                    }
                    Err(e) => errors.push(e),
                }
            }
        }

        for e in &errors {
            self.report_error(e);
        }
        for (control, position) in updated {
            self.render_control(control, position);
        }
    }

    /// Runs the poll timer until `shutdown` resolves.
    ///
    /// Each tick starts a new poll without waiting for earlier ones, so polls
    /// may overlap; the sequence check in [`finish_poll`](Self::finish_poll)
    /// keeps a slow response from overwriting a fresher one.
    pub async fn run<F>(self: Arc<Self>, shutdown: F)
    where
        F: Future<Output = ()>,
        T: 'static,
        S: 'static,
    {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();
        tokio::pin!(shutdown);

        info!(interval = ?self.config.poll_interval, "sync loop started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let engine = Arc::clone(&self);
                    in_flight.spawn(async move { engine.poll().await });
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "poll task failed");
                    }
                }
            }
        }
        in_flight.abort_all();
        info!("sync loop stopped");
    }

    // =========================================================================
    // Error funnel
    // =========================================================================

    /// Logs a user-visible success.
    pub fn report_ok(&self, message: impl Into<String>) {
        let entry = LogEntry::ok(message);
        info!(message = %entry.message, "ok");
        self.record(entry);
    }

    /// Logs a failure.
    pub fn report_error(&self, error: &PanelError) {
        let remote = error.is_remote();
        warn!(%error, remote, "panel error");
        {
            let mut state = self.state.lock();
            if remote {
                state.stats.remote_errors += 1;
            } else {
                state.stats.local_errors += 1;
            }
        }
        self.record(LogEntry::error(error.to_string()));
    }

    fn record(&self, entry: LogEntry) {
        self.state.lock().log.push(entry.clone());
        self.sink.append_log_entry(&entry);
    }
}

/// Counts a user track change as in flight for as long as it lives.
struct PendingSelection<'a>(&'a Mutex<PanelState>);

impl<'a> PendingSelection<'a> {
    fn new(state: &'a Mutex<PanelState>) -> Self {
        state.lock().pending_selections += 1;
        Self(state)
    }
}

impl Drop for PendingSelection<'_> {
    fn drop(&mut self) {
        self.0.lock().pending_selections -= 1;
    }
}

/// Index of a control in `CONTROLS`.
fn slot(control: &Control) -> PanelResult<usize> {
    CONTROLS
        .iter()
        .position(|c| c.id == control.id)
        .ok_or_else(|| PanelError::UnknownControl(control.id.to_string()))
}
