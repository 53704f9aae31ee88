//! Watch command implementation.
//!
//! A headless control panel: the sync loop keeps the terminal in step with
//! the device while commands typed on stdin drive it.

use super::{connect, describe_state, resolve_control, Transport};
use crate::sink::TerminalSink;
use b3ctl_engine::{PanelConfig, SyncEngine};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

type Engine = SyncEngine<Transport, TerminalSink>;

const HELP: &str = "\
commands:
  play | pause          toggle playback of the selected track
  stop                  stop playback
  track <name>          select a track (stops playback)
  set <control> <value> set a control to a physical value
  tracks                list tracks
  labels                reprint every control
  stats                 show sync statistics
  help                  show this text
  quit                  exit";

/// A parsed stdin command.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    PlayPause,
    Stop,
    Track(String),
    Set(String, f64),
    Tracks,
    Labels,
    Stats,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match word {
            "" => return Ok(None),
            "play" | "pause" => Command::PlayPause,
            "stop" => Command::Stop,
            "track" if !rest.is_empty() => Command::Track(rest.to_string()),
            "track" => return Err("usage: track <name>".into()),
            "set" => {
                let (name, value) = rest
                    .split_once(' ')
                    .ok_or_else(|| "usage: set <control> <value>".to_string())?;
                let value = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("not a number: {}", value.trim()))?;
                Command::Set(name.to_string(), value)
            }
            "tracks" => Command::Tracks,
            "labels" => Command::Labels,
            "stats" => Command::Stats,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(Some(command))
    }
}

/// Runs the watch command until ctrl-c or `quit`.
pub async fn run(config: PanelConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("connecting to {}", config.base_url);
    let transport = connect(&config)?;
    let engine = Arc::new(SyncEngine::new(config, transport, TerminalSink::new()));

    engine.load_tracks().await;

    tokio::select! {
        _ = Arc::clone(&engine).run(ctrl_c()) => {}
        result = read_commands(&engine) => result?,
    }
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

async fn read_commands(engine: &Engine) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => return Ok(()),
            Ok(Some(command)) => execute(engine, command).await,
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }
    // stdin closed; keep syncing until ctrl-c.
    std::future::pending::<()>().await;
    Ok(())
}

async fn execute(engine: &Engine, command: Command) {
    match command {
        Command::PlayPause => engine.play_pause().await,
        Command::Stop => engine.stop().await,
        Command::Track(name) => {
            if !engine.tracks().contains(&name) {
                eprintln!("no such track: {name}");
                return;
            }
            engine.select_track(&name).await;
        }
        Command::Set(name, value) => {
            let control = match resolve_control(&name) {
                Ok(control) => control,
                Err(message) => {
                    eprintln!("{message}");
                    return;
                }
            };
            match engine.config().scale.to_normalized(value, control.log_scale) {
                Ok(position) => engine.commit_edit(control, position).await,
                Err(e) => engine.report_error(&e),
            }
        }
        Command::Tracks => {
            let selected = engine.selected_track();
            for track in engine.tracks() {
                let marker = if Some(&track) == selected.as_ref() { "*" } else { " " };
                println!("{marker} {track}");
            }
        }
        Command::Labels => {
            engine.sink().reset();
            engine.refresh_labels();
        }
        Command::Stats => {
            let stats = engine.stats();
            println!("state:            {}", describe_state(engine.playback()));
            println!("polls issued:     {}", stats.polls_issued);
            println!("polls applied:    {}", stats.polls_applied);
            println!("polls discarded:  {}", stats.polls_discarded);
            println!("polls failed:     {}", stats.polls_failed);
            println!("configs pushed:   {}", stats.configs_pushed);
            println!("actions sent:     {}", stats.actions_sent);
            println!("device errors:    {}", stats.remote_errors);
            println!("local errors:     {}", stats.local_errors);
            match stats.last_applied_at {
                Some(at) => println!("last update:      {:.1}s ago", at.elapsed().as_secs_f64()),
                None => println!("last update:      never"),
            }
            if !engine.is_loaded() {
                println!("config not loaded yet; edits are not pushed");
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}
