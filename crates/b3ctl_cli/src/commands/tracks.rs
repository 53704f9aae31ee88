//! Tracks command implementation.

use super::connect;
use b3ctl_engine::{PanelConfig, PanelTransport};

/// Runs the tracks command.
pub async fn run(config: &PanelConfig, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let transport = connect(config)?;
    let tracks = transport.fetch_tracks().await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&tracks)?),
        _ => {
            for track in &tracks {
                println!("{track}");
            }
            println!("({} tracks)", tracks.len());
        }
    }
    Ok(())
}
