//! # Wodclock Core Library
//!
//! This library provides the core business logic for the Wodclock workout
//! timer: a tick-driven session execution engine that drives a real-time
//! countdown through an ordered sequence of timed segments under one of
//! four training formats, and emits exactly one terminal result when the
//! session ends.
//!
//! ## Architecture
//!
//! - **Session Engine**: A tick-driven state machine that requires the
//!   host to invoke `tick()` once per second; one tick dispatches both
//!   logical clocks (overall and segment) in a fixed order
//! - **Sequencer**: Start-position and format-override rules (Emom minute
//!   forcing, capped-format display-only work segments)
//! - **Cues / Wake Lock**: Best-effort collaborators behind traits; every
//!   failure is swallowed at the call site and recorded, never allowed to
//!   affect session state
//! - **Config**: TOML-based host preferences
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core session state machine
//! - [`WorkoutDefinition`]: Immutable session input
//! - [`CueEmitter`]: Trait for host audio backends
//! - [`WakeLock`]: Trait for the platform stay-awake capability
//! - [`Config`]: Application configuration management

pub mod config;
pub mod cues;
pub mod error;
pub mod events;
pub mod session;
pub mod workout;

pub use config::Config;
pub use cues::{CueDispatcher, CueEmitter, CueError, NullCueEmitter};
pub use error::{ConfigError, CoreError, SessionError};
pub use events::Event;
pub use session::{
    NoopWakeLock, RunState, SessionEngine, SessionOutcome, WakeLock, WakeLockError,
    WakeLockManager,
};
pub use workout::{Exercise, Format, Phase, Quantity, Segment, WorkoutDefinition};
