//! Get command implementation.

use super::{connect, describe_state, resolve_control};
use b3ctl_engine::{format_value, PanelConfig, PanelTransport};
use b3ctl_protocol::{ConfigSnapshot, CONTROLS};

/// Runs the get command.
///
/// Prints one control when `control` is given, otherwise the whole panel.
pub async fn run(
    config: &PanelConfig,
    control: Option<&str>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport = connect(config)?;
    let snapshot = transport.fetch_config().await?;

    if let Some(name) = control {
        let control = resolve_control(name)?;
        let value = snapshot
            .value(control.key)
            .ok_or_else(|| format!("device reported no value for {}", control.key))?;
        match format {
            "json" => println!("{}", serde_json::json!({ control.key: value })),
            _ => println!("{}", format_value(value)),
        }
        return Ok(());
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        _ => print_text_output(&snapshot),
    }
    Ok(())
}

fn print_text_output(snapshot: &ConfigSnapshot) {
    println!("state:  {}", describe_state(snapshot.state));
    println!("song:   {}", snapshot.active_song().unwrap_or("-"));
    println!();
    for control in &CONTROLS {
        let text = snapshot
            .value(control.key)
            .map(format_value)
            .unwrap_or_else(|| "(missing)".to_string());
        println!("{:<24} {}", control.label, text);
    }

    let extra: Vec<_> = snapshot
        .config
        .keys()
        .filter(|key| CONTROLS.iter().all(|c| c.key != key.as_str()))
        .collect();
    if !extra.is_empty() {
        println!();
        for key in extra {
            let text = snapshot
                .value(key)
                .map(format_value)
                .unwrap_or_else(|| "(missing)".to_string());
            println!("{key:<24} {text}");
        }
    }
}
