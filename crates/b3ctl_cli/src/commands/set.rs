//! Set command implementation.

use super::{check_log, connect, resolve_control};
use crate::sink::TerminalSink;
use b3ctl_engine::{format_value, PanelConfig, SyncEngine};

/// Runs the set command.
///
/// The device always receives the full configuration, so the current one is
/// polled first and only the named control changes. With `position`, `value`
/// is a slider position in `[0, 1]` rather than a physical value.
pub async fn run(
    config: PanelConfig,
    control: &str,
    value: f64,
    position: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let control = resolve_control(control)?;
    let scale = config.scale;
    let transport = connect(&config)?;
    let engine = SyncEngine::new(config, transport, TerminalSink::log_only());

    engine.poll().await;
    check_log(&engine)?;

    let target = if position {
        value
    } else {
        scale.to_normalized(value, control.log_scale)?
    };
    engine.commit_edit(control, target).await;
    check_log(&engine)?;

    let sent = engine.physical_value(control)?;
    println!("{} = {}", control.key, format_value(sent));
    if control.log_scale {
        let step = scale.quantization_step(engine.position(control)?);
        println!("  slider precision: ±{step:.2e} of full travel");
    }
    Ok(())
}
