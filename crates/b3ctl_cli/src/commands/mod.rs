//! CLI command implementations.

pub mod action;
pub mod get;
pub mod set;
pub mod tracks;
pub mod watch;

use b3ctl_engine::{
    HttpTransport, LogStatus, PanelConfig, PanelResult, PresentationSink, ReqwestClient,
    SyncEngine,
};
use b3ctl_protocol::{lookup_control, Control, PlaybackState, CONTROLS};

/// HTTP transport used by every command.
pub type Transport = HttpTransport<ReqwestClient>;

/// Opens a transport to the device named in `config`.
pub fn connect(config: &PanelConfig) -> PanelResult<Transport> {
    let client = ReqwestClient::new(config.request_timeout)?;
    Ok(HttpTransport::new(config.base_url.clone(), client))
}

/// Resolves a control by id (`lpfCutoff`) or config key (`lpf_cutoff`).
pub fn resolve_control(name: &str) -> Result<&'static Control, String> {
    lookup_control(name).ok_or_else(|| {
        let known: Vec<_> = CONTROLS.iter().map(|c| c.key).collect();
        format!("unknown control '{name}' (expected one of: {})", known.join(", "))
    })
}

/// Operator-facing name of a playback state.
pub fn describe_state(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "playing",
        PlaybackState::Paused => "paused",
        PlaybackState::Idle => "stopped",
    }
}

/// Fails with the newest error in the engine's log, if there is one.
pub fn check_log<S: PresentationSink>(engine: &SyncEngine<Transport, S>) -> Result<(), String> {
    match engine
        .log_entries()
        .into_iter()
        .find(|entry| entry.status == LogStatus::Error)
    {
        Some(entry) => Err(entry.message),
        None => Ok(()),
    }
}
