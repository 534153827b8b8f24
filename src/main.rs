//! Greenhouse simulator: headless entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  stdin ──▶ console thread ──channel──▶ main loop          │
//! │                                          │ SimCommand     │
//! │  SimulationConfig (InputPort)            ▼                │
//! │        └──────────────────────────▶ Simulator ──▶ LogDisplay
//! │                                     env · T · H · M loops │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Type `pause`, `resume`, or `quit` on stdin while it runs.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{info, warn};

use greenhouse::adapters::log_sink::LogDisplay;
use greenhouse::app::ports::DisplayPort;
use greenhouse::{SimCommand, SimulationConfig, Simulator};

/// How often the main loop checks for completion and the deadline.
const POLL: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(name = "greenhouse-sim")]
#[command(about = "Simulate greenhouse temperature, humidity, and soil moisture control")]
struct Args {
    /// JSON file with starting values, bands, rates, and refresh intervals
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append every tick to this record file
    #[arg(long, conflicts_with = "load")]
    save: Option<PathBuf>,

    /// Replay a record file instead of simulating
    #[arg(long)]
    load: Option<PathBuf>,

    /// Stop after this many seconds (default: run until `quit` or end of playback)
    #[arg(long)]
    duration: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Console {
    Command(ConsoleCommand),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleCommand {
    Pause,
    Resume,
}

fn parse_console(line: &str) -> Option<Console> {
    match line.trim().to_ascii_lowercase().as_str() {
        "pause" | "p" => Some(Console::Command(ConsoleCommand::Pause)),
        "resume" | "r" => Some(Console::Command(ConsoleCommand::Resume)),
        "quit" | "q" | "exit" => Some(Console::Quit),
        _ => None,
    }
}

/// Forward stdin lines until EOF.  Detached; the process exit ends it.
fn spawn_console(tx: Sender<Console>) -> Result<()> {
    thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_console(&line) {
                    Some(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => warn!("Unknown command '{}' (pause, resume, quit)", line.trim()),
                }
            }
        })
        .context("spawning console thread")?;
    Ok(())
}

fn run(sim: &mut Simulator, mut console: Receiver<Console>, duration: Option<Duration>) {
    let deadline = duration.map(|d| Instant::now() + d);
    loop {
        if sim.finished() {
            info!("All loops finished");
            return;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            info!("Duration elapsed");
            return;
        }
        match console.recv_timeout(POLL) {
            Ok(Console::Quit) => return,
            Ok(Console::Command(cmd)) => {
                let cmd = match cmd {
                    ConsoleCommand::Pause => SimCommand::Pause,
                    ConsoleCommand::Resume => SimCommand::Resume,
                };
                if let Err(e) = sim.handle_command(cmd) {
                    warn!("{}", e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // stdin closed: keep running until the deadline or the end.
                console = crossbeam_channel::never();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    let display: Arc<dyn DisplayPort> = Arc::new(LogDisplay::new());
    let mut sim = Simulator::new(display);

    if let Some(path) = &args.load {
        sim.open_playback(path).context("opening playback file")?;
    }
    if let Some(path) = &args.save {
        sim.save_to(path).context("opening save file")?;
    }
    sim.setup(&config).context("invalid starting parameters")?;
    sim.start()?;

    let (tx, rx) = crossbeam_channel::unbounded();
    spawn_console(tx)?;

    run(&mut sim, rx, args.duration.map(Duration::from_secs));
    sim.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_commands() {
        assert_eq!(
            parse_console(" Pause \n"),
            Some(Console::Command(ConsoleCommand::Pause))
        );
        assert_eq!(parse_console("r"), Some(Console::Command(ConsoleCommand::Resume)));
        assert_eq!(parse_console("quit"), Some(Console::Quit));
        assert_eq!(parse_console("faster"), None);
    }

    #[test]
    fn save_and_load_conflict() {
        let err = Args::try_parse_from(["greenhouse-sim", "--save", "a", "--load", "b"]);
        assert!(err.is_err());
        let ok = Args::try_parse_from(["greenhouse-sim", "--load", "b", "--duration", "3"]).unwrap();
        assert_eq!(ok.duration, Some(3));
    }
}
