//! B3 control CLI
//!
//! Terminal control panel for the B3 audio device.
//!
//! # Commands
//!
//! - `watch` - Live panel: follow the device and drive it from stdin
//! - `tracks` - List the audio files on the device
//! - `get` - Show the device configuration
//! - `set` - Change one control
//! - `action` - Play, pause or stop

mod commands;
mod sink;

use b3ctl_engine::{PanelConfig, DEFAULT_BASE_URL};
use b3ctl_protocol::Action;
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// B3 audio device control panel.
#[derive(Parser)]
#[command(name = "b3ctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the device API
    #[arg(global = true, short, long, default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Poll period in milliseconds
    #[arg(global = true, long, default_value = "1000")]
    interval_ms: u64,

    /// Number of event log entries kept
    #[arg(global = true, long, default_value = "5")]
    log_capacity: usize,

    /// Request timeout in milliseconds
    #[arg(global = true, long, default_value = "10000")]
    timeout_ms: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn panel_config(&self) -> PanelConfig {
        PanelConfig::new(&self.url)
            .with_poll_interval(Duration::from_millis(self.interval_ms.max(1)))
            .with_max_log_entries(self.log_capacity.max(1))
            .with_request_timeout(Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the device live and accept commands on stdin
    Watch,

    /// List the audio files on the device
    Tracks {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the device configuration
    Get {
        /// Only show this control (id or config key)
        control: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Change one control and push the configuration
    Set {
        /// Control id or config key
        control: String,

        /// Physical value (or slider position with --position)
        value: f64,

        /// Interpret the value as a slider position in [0, 1]
        #[arg(short, long)]
        position: bool,
    },

    /// Send a playback action
    Action {
        /// Action to send
        #[arg(value_enum)]
        action: ActionArg,

        /// Track the action applies to
        #[arg(short, long, default_value = "")]
        track: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    /// Toggle between playing and paused
    PlayPause,
    /// Stop playback
    Stop,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::PlayPause => Action::PlayPause,
            ActionArg::Stop => Action::Stop,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins when set
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.panel_config();
    match cli.command {
        Commands::Watch => commands::watch::run(config).await?,
        Commands::Tracks { format } => commands::tracks::run(&config, &format).await?,
        Commands::Get { control, format } => {
            commands::get::run(&config, control.as_deref(), &format).await?
        }
        Commands::Set {
            control,
            value,
            position,
        } => commands::set::run(config, &control, value, position).await?,
        Commands::Action { action, track } => {
            commands::action::run(&config, action.into(), &track).await?
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["b3ctl", "watch"]);
        let config = cli.panel_config();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.max_log_entries, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!cli.verbose);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "b3ctl",
            "set",
            "lpf_cutoff",
            "2500",
            "--url",
            "http://b3.local:5000",
            "--interval-ms",
            "250",
            "-v",
        ]);
        assert_eq!(cli.panel_config().poll_interval, Duration::from_millis(250));
        assert_eq!(cli.url, "http://b3.local:5000");
        assert!(cli.verbose);
        let Commands::Set { control, value, position } = cli.command else {
            panic!("expected set");
        };
        assert_eq!(control, "lpf_cutoff");
        assert_eq!(value, 2500.0);
        assert!(!position);
    }

    #[test]
    fn action_names() {
        let cli = Cli::parse_from(["b3ctl", "action", "play-pause", "--track", "a.mp3"]);
        let Commands::Action { action, track } = cli.command else {
            panic!("expected action");
        };
        assert_eq!(Action::from(action), Action::PlayPause);
        assert_eq!(track, "a.mp3");
    }
}
