//! Interactive session runner.
//!
//! Owns the 1 Hz tick schedule the engine requires and plays the caller
//! roles from the engine's point of view: input supplier, cue emitter,
//! wake-lock host, and results consumer. Events are printed to stdout as
//! JSON; the live status line and cue bells go to stderr.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};

use wodclock_core::cues::{CountdownValue, CueDispatcher, CueEmitter, CueError};
use wodclock_core::error::Result;
use wodclock_core::events::Event;
use wodclock_core::session::{NoopWakeLock, RunState, SessionEngine, WakeLockManager};
use wodclock_core::workout::Phase;
use wodclock_core::Config;

use crate::common::{format_mmss, load_workout};

#[derive(Args)]
pub struct RunArgs {
    /// Built-in preset name
    #[arg(long, conflicts_with = "file")]
    preset: Option<String>,
    /// Path to a workout definition JSON file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Suppress audio cues for this run
    #[arg(long)]
    quiet: bool,
}

/// Terminal bell as the audio collaborator.
struct TerminalCues;

impl CueEmitter for TerminalCues {
    fn play_countdown(&mut self, value: CountdownValue) -> std::result::Result<(), CueError> {
        let label = match value {
            0 => "GO".to_string(),
            n => n.to_string(),
        };
        eprint!("\x07{label} ");
        std::io::stderr()
            .flush()
            .map_err(|e| CueError::Playback(e.to_string()))
    }

    fn play_phase_transition(&mut self, phase: Phase) -> std::result::Result<(), CueError> {
        let label = match phase {
            Phase::Work => "WORK",
            Phase::Rest => "REST",
            Phase::Prepare => "PREPARE",
        };
        eprint!("\x07[{label}] ");
        std::io::stderr()
            .flush()
            .map_err(|e| CueError::Playback(e.to_string()))
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let workout = load_workout(args.preset, args.file)?;
    let config = Config::load()?;

    let cues = CueDispatcher::new(Box::new(TerminalCues), config.cues.enabled && !args.quiet);
    let wake = if config.wake_lock.enabled {
        // The terminal has no screen lock to hold; NoopWakeLock keeps the
        // policy observable without a platform capability.
        WakeLockManager::new(Box::new(NoopWakeLock))
    } else {
        WakeLockManager::disabled()
    };

    let engine = SessionEngine::start(workout, cues, wake)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(drive(engine))
}

async fn drive(mut engine: SessionEngine) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    eprintln!("commands: p pause | r resume | f finish now | q end | y confirm | n cancel");

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first interval tick completes immediately; consume it so the
    // session's first second is a full one.
    ticker.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(event) = engine.tick() {
                    print_event(&event)?;
                    if engine.is_terminal() {
                        break;
                    }
                }
                status_line(&engine);
            }
            line = lines.next_line(), if stdin_open => {
                let Ok(Some(line)) = line else {
                    stdin_open = false;
                    continue;
                };
                let event = match line.trim() {
                    "p" => engine.pause(),
                    "r" => engine.resume(),
                    "f" => engine.finish_now(),
                    "q" => engine.request_end(),
                    "y" => engine.confirm_end(),
                    "n" => engine.cancel_end(),
                    "" => None,
                    other => {
                        eprintln!("unknown command: {other}");
                        None
                    }
                };
                if let Some(event) = event {
                    print_event(&event)?;
                }
                if engine.is_terminal() {
                    break;
                }
                if engine.run_state() == RunState::ConfirmPending {
                    eprintln!("end the session? y to confirm, n to keep going");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                match engine.run_state() {
                    RunState::Running | RunState::Paused => {
                        if let Some(event) = engine.request_end() {
                            print_event(&event)?;
                        }
                        eprintln!("\nend the session? Ctrl-C again to abort, n to keep going");
                    }
                    RunState::ConfirmPending => {
                        if let Some(event) = engine.confirm_end() {
                            print_event(&event)?;
                        }
                        break;
                    }
                    _ => break,
                }
            }
        }
    }

    engine.teardown();
    if let Some(outcome) = engine.outcome() {
        eprintln!();
        eprintln!(
            "session {}",
            if outcome.aborted { "aborted" } else { "completed" }
        );
        if let Some(elapsed) = outcome.elapsed_secs {
            eprintln!("elapsed: {}", format_mmss(elapsed));
        }
    }
    Ok(())
}

fn print_event(event: &Event) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

fn status_line(engine: &SessionEngine) {
    let name = engine
        .current_segment()
        .map(|s| s.name.clone())
        .unwrap_or_default();
    eprint!(
        "\r{:<16} {}  |  overall {}   ",
        name,
        format_mmss(engine.segment_remaining_secs()),
        format_mmss(engine.overall_remaining_secs()),
    );
    let _ = std::io::stderr().flush();
}
