//! Action command implementation.

use super::{connect, describe_state};
use b3ctl_engine::{PanelConfig, PanelTransport};
use b3ctl_protocol::Action;

/// Runs the action command, then reports the resulting playback state.
pub async fn run(
    config: &PanelConfig,
    action: Action,
    track: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport = connect(config)?;
    transport.dispatch_action(action, track).await?;
    println!("sent {action}");

    let snapshot = transport.fetch_config().await?;
    println!(
        "state: {} ({})",
        describe_state(snapshot.state),
        snapshot.active_song().unwrap_or("no track")
    );
    Ok(())
}
