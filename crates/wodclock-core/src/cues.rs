//! Audio cue dispatch.
//!
//! The engine never talks to an audio backend directly. Hosts supply a
//! [`CueEmitter`] and the engine routes every request through a
//! [`CueDispatcher`], which swallows failures and keeps a playback record
//! log. A failed or disabled cue must never affect session state or timing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workout::Phase;

/// Countdown cue value: 3, 2, 1, and 0 for "go".
pub type CountdownValue = u8;

#[derive(Error, Debug)]
pub enum CueError {
    /// Audio backend not available (e.g. not yet unlocked by a user gesture).
    #[error("audio backend unavailable")]
    Unavailable,

    #[error("cue playback failed: {0}")]
    Playback(String),
}

/// Host-provided audio collaborator. Both calls are fire-and-forget from
/// the engine's point of view; errors are recorded, never propagated.
pub trait CueEmitter {
    fn play_countdown(&mut self, value: CountdownValue) -> Result<(), CueError>;
    fn play_phase_transition(&mut self, phase: Phase) -> Result<(), CueError>;
}

/// Emitter for silent hosts and tests.
#[derive(Debug, Default)]
pub struct NullCueEmitter;

impl CueEmitter for NullCueEmitter {
    fn play_countdown(&mut self, _value: CountdownValue) -> Result<(), CueError> {
        Ok(())
    }

    fn play_phase_transition(&mut self, _phase: Phase) -> Result<(), CueError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKind {
    Countdown(CountdownValue),
    PhaseTransition(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueOutcome {
    Played,
    Disabled,
    Failed,
}

/// One dispatched cue with its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueRecord {
    pub kind: CueKind,
    pub outcome: CueOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

/// Wraps a boxed emitter with an enabled flag and a record log.
pub struct CueDispatcher {
    emitter: Box<dyn CueEmitter>,
    enabled: bool,
    log: Vec<CueRecord>,
}

impl std::fmt::Debug for CueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueDispatcher")
            .field("enabled", &self.enabled)
            .field("log_len", &self.log.len())
            .finish()
    }
}

impl CueDispatcher {
    pub fn new(emitter: Box<dyn CueEmitter>, enabled: bool) -> Self {
        Self {
            emitter,
            enabled,
            log: Vec::new(),
        }
    }

    /// Dispatcher that records but never plays.
    pub fn silent() -> Self {
        Self::new(Box::new(NullCueEmitter), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn countdown(&mut self, value: CountdownValue) {
        self.dispatch(CueKind::Countdown(value));
    }

    pub fn phase_transition(&mut self, phase: Phase) {
        self.dispatch(CueKind::PhaseTransition(phase));
    }

    pub fn log(&self) -> &[CueRecord] {
        &self.log
    }

    fn dispatch(&mut self, kind: CueKind) {
        let (outcome, detail) = if !self.enabled {
            (CueOutcome::Disabled, None)
        } else {
            let result = match kind {
                CueKind::Countdown(value) => self.emitter.play_countdown(value),
                CueKind::PhaseTransition(phase) => self.emitter.play_phase_transition(phase),
            };
            match result {
                Ok(()) => (CueOutcome::Played, None),
                Err(e) => (CueOutcome::Failed, Some(e.to_string())),
            }
        };
        self.log.push(CueRecord {
            kind,
            outcome,
            detail,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Emitter that fails every call, for failure-swallowing tests.
    struct BrokenEmitter;

    impl CueEmitter for BrokenEmitter {
        fn play_countdown(&mut self, _value: CountdownValue) -> Result<(), CueError> {
            Err(CueError::Unavailable)
        }

        fn play_phase_transition(&mut self, _phase: Phase) -> Result<(), CueError> {
            Err(CueError::Playback("device busy".into()))
        }
    }

    #[test]
    fn plays_and_records() {
        let mut cues = CueDispatcher::new(Box::new(NullCueEmitter), true);
        cues.countdown(3);
        cues.phase_transition(Phase::Work);

        assert_eq!(cues.log().len(), 2);
        assert!(cues.log().iter().all(|r| r.outcome == CueOutcome::Played));
    }

    #[test]
    fn disabled_records_without_playing() {
        let mut cues = CueDispatcher::silent();
        cues.countdown(0);

        assert_eq!(cues.log().len(), 1);
        assert_eq!(cues.log()[0].outcome, CueOutcome::Disabled);
    }

    #[test]
    fn failures_are_swallowed_and_recorded() {
        let mut cues = CueDispatcher::new(Box::new(BrokenEmitter), true);
        cues.countdown(1);
        cues.phase_transition(Phase::Rest);

        assert_eq!(cues.log().len(), 2);
        assert!(cues.log().iter().all(|r| r.outcome == CueOutcome::Failed));
        assert!(cues.log()[1].detail.as_deref().unwrap().contains("device busy"));
    }
}
