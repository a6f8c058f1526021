//! Workout session engine.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads or timers -- the host schedules one `tick()` per second while
//! the session runs. Two logical clocks (overall and segment) are
//! decremented by that single tick in a fixed order, so they cannot drift
//! apart and a tick always runs to completion before any command is
//! observed.
//!
//! ## State Transitions
//!
//! ```text
//! Running -> (Paused | ConfirmPending | Terminal)
//! Paused -> (Running | ConfirmPending)
//! ConfirmPending -> (Running | Paused | Terminal)
//! ```
//!
//! `Terminal` is absorbing; the single `SessionEnded` event is produced by
//! the [`CompletionGate`](super::completion::CompletionGate).
//!
//! Pause is lossless by construction: decrements only happen inside
//! `tick()` while `Running`, never from wall-clock deltas, so resuming
//! continues from the exact frozen values. The flip side is deliberate and
//! documented: a host runtime that throttles the tick schedule while
//! backgrounded makes displayed time diverge from real elapsed time. That
//! approximation is kept -- hosts needing accuracy must drive ticks from a
//! non-throttled scheduler.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::completion::{CompletionGate, SessionOutcome};
use super::sequencer;
use super::wake::WakeLockManager;
use crate::cues::CueDispatcher;
use crate::error::SessionError;
use crate::events::Event;
use crate::workout::{Format, Phase, Segment, WorkoutDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Paused,
    /// End requested; clocks frozen until the user confirms or cancels.
    ConfirmPending,
    Terminal,
}

/// Core session engine. One instance per session; owns its state
/// exclusively.
#[derive(Debug)]
pub struct SessionEngine {
    workout: WorkoutDefinition,
    run_state: RunState,
    segment_index: usize,
    segment_remaining_secs: u32,
    overall_remaining_secs: u32,
    /// False for capped-format work segments: the stored value is display
    /// only, the overall clock drives.
    segment_clock_active: bool,
    /// State to restore when the end confirmation is cancelled.
    resume_to: Option<RunState>,
    /// Elapsed value captured the instant the end prompt opened.
    elapsed_at_prompt: Option<u32>,
    gate: CompletionGate,
    cues: CueDispatcher,
    wake: WakeLockManager,
    torn_down: bool,
}

impl SessionEngine {
    /// Start a session: validate the definition, compute the starting
    /// segment, and begin running.
    ///
    /// # Errors
    ///
    /// Refuses construction for an empty segment list, or a capped format
    /// with a zero total duration (its overall clock would start expired).
    pub fn start(
        workout: WorkoutDefinition,
        cues: CueDispatcher,
        wake: WakeLockManager,
    ) -> Result<Self, SessionError> {
        if workout.segments.is_empty() {
            return Err(SessionError::EmptyWorkout { id: workout.id });
        }
        if workout.format.is_capped() && workout.total_duration_secs == 0 {
            return Err(SessionError::ZeroDuration { id: workout.id });
        }

        let (segment_index, segment_remaining_secs) =
            sequencer::starting_position(&workout.segments, workout.format);
        let segment_clock_active =
            sequencer::segment_clock_active(&workout.segments[segment_index], workout.format);
        let overall_remaining_secs = workout.total_duration_secs;

        let mut engine = Self {
            workout,
            run_state: RunState::Running,
            segment_index,
            segment_remaining_secs,
            overall_remaining_secs,
            segment_clock_active,
            resume_to: None,
            elapsed_at_prompt: None,
            gate: CompletionGate::new(),
            cues,
            wake,
            torn_down: false,
        };
        engine.wake.sync(true);
        Ok(engine)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_terminal(&self) -> bool {
        self.run_state == RunState::Terminal
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn segment_remaining_secs(&self) -> u32 {
        self.segment_remaining_secs
    }

    pub fn overall_remaining_secs(&self) -> u32 {
        self.overall_remaining_secs
    }

    pub fn workout(&self) -> &WorkoutDefinition {
        &self.workout
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.workout.segments.get(self.segment_index)
    }

    /// Terminal result, once the gate has fired.
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.gate.outcome()
    }

    pub fn cues(&self) -> &CueDispatcher {
        &self.cues
    }

    pub fn wake(&self) -> &WakeLockManager {
        &self.wake
    }

    /// 0.0 .. 100.0 progress of the overall clock.
    pub fn overall_progress_pct(&self) -> f64 {
        let total = self.workout.total_duration_secs as f64;
        if total == 0.0 {
            return 0.0;
        }
        let spent = (self.workout.total_duration_secs - self.overall_remaining_secs) as f64;
        (spent / total * 100.0).min(100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let segment = self.current_segment();
        Event::StateSnapshot {
            run_state: self.run_state,
            segment_index: self.segment_index,
            phase: segment.map(|s| s.phase).unwrap_or(Phase::Work),
            segment_name: segment.map(|s| s.name.clone()).unwrap_or_default(),
            segment_remaining_secs: self.segment_remaining_secs,
            overall_remaining_secs: self.overall_remaining_secs,
            progress_pct: self.overall_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn pause(&mut self) -> Option<Event> {
        if self.torn_down || self.run_state != RunState::Running {
            return None;
        }
        self.run_state = RunState::Paused;
        self.wake.sync(false);
        Some(Event::SessionPaused {
            segment_remaining_secs: self.segment_remaining_secs,
            overall_remaining_secs: self.overall_remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.torn_down || self.run_state != RunState::Paused {
            return None;
        }
        self.run_state = RunState::Running;
        self.wake.sync(true);
        Some(Event::SessionResumed {
            segment_remaining_secs: self.segment_remaining_secs,
            overall_remaining_secs: self.overall_remaining_secs,
            at: Utc::now(),
        })
    }

    /// Open the end-confirmation prompt. Both clocks freeze and the wake
    /// lock is released until the user decides.
    pub fn request_end(&mut self) -> Option<Event> {
        if self.torn_down {
            return None;
        }
        match self.run_state {
            RunState::Running | RunState::Paused => {
                self.resume_to = Some(self.run_state);
                self.elapsed_at_prompt = self.capped_elapsed();
                self.run_state = RunState::ConfirmPending;
                self.wake.sync(false);
                Some(Event::EndRequested { at: Utc::now() })
            }
            _ => None,
        }
    }

    /// Dismiss the end confirmation: return to the exact prior state. The
    /// wake lock is re-acquired only if the session had been actively
    /// running before the prompt opened.
    pub fn cancel_end(&mut self) -> Option<Event> {
        if self.torn_down || self.run_state != RunState::ConfirmPending {
            return None;
        }
        let back = self.resume_to.take().unwrap_or(RunState::Running);
        self.run_state = back;
        self.elapsed_at_prompt = None;
        self.wake.sync(back == RunState::Running);
        Some(Event::EndCancelled { at: Utc::now() })
    }

    /// Confirm the abort. Capped formats report the elapsed value captured
    /// when the prompt opened.
    pub fn confirm_end(&mut self) -> Option<Event> {
        if self.torn_down || self.run_state != RunState::ConfirmPending {
            return None;
        }
        let elapsed = self.elapsed_at_prompt.take();
        self.finish(true, elapsed)
    }

    /// Explicit "finish now" for capped formats: the task is done before
    /// the cap. No-op for round formats.
    pub fn finish_now(&mut self) -> Option<Event> {
        if self.torn_down
            || self.run_state != RunState::Running
            || !self.workout.format.is_capped()
        {
            return None;
        }
        let elapsed = self.capped_elapsed();
        self.finish(false, elapsed)
    }

    /// Visibility signal from the host surface; only the wake lock cares.
    pub fn set_visible(&mut self, visible: bool) {
        let running = !self.torn_down && self.run_state == RunState::Running;
        self.wake.set_visible(visible, running);
    }

    /// Single cleanup path: stops all further ticks and commands and
    /// releases the wake lock, regardless of run state. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.wake.release();
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Advance both clocks by one second. Call at 1 Hz while the session
    /// runs; no-op in any other state.
    ///
    /// The overall clock is resolved before the segment clock. When both
    /// would terminate the session in the same tick, the completion gate
    /// still admits exactly one transition.
    pub fn tick(&mut self) -> Option<Event> {
        if self.torn_down || self.run_state != RunState::Running {
            return None;
        }

        // Overall clock: always ticks while running.
        self.overall_remaining_secs = self.overall_remaining_secs.saturating_sub(1);
        if self.workout.format.is_capped() {
            match self.overall_remaining_secs {
                1..=3 => self.cues.countdown(self.overall_remaining_secs as u8),
                0 => {
                    self.cues.countdown(0);
                    let elapsed = match self.workout.format {
                        Format::TimeCap => Some(self.workout.total_duration_secs),
                        _ => None,
                    };
                    return self.finish(false, elapsed);
                }
                _ => {}
            }
        }

        // Segment clock: only for segments it drives.
        if !self.segment_clock_active {
            return None;
        }
        self.segment_remaining_secs = self.segment_remaining_secs.saturating_sub(1);
        if self.current_phase() == Phase::Prepare {
            // 3-2-1 then "go" on the transition into the first real segment.
            if self.segment_remaining_secs <= 3 {
                self.cues.countdown(self.segment_remaining_secs as u8);
            }
        }
        if self.segment_remaining_secs == 0 {
            return self.advance_segment();
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn current_phase(&self) -> Phase {
        self.current_segment().map(|s| s.phase).unwrap_or(Phase::Work)
    }

    fn capped_elapsed(&self) -> Option<u32> {
        if !self.workout.format.is_capped() {
            return None;
        }
        Some(
            self.workout
                .total_duration_secs
                .saturating_sub(self.overall_remaining_secs),
        )
    }

    /// Segment clock reached zero: move to the next segment, or terminate
    /// when this was the last one.
    fn advance_segment(&mut self) -> Option<Event> {
        let mut next = self.segment_index + 1;
        loop {
            if next >= self.workout.segments.len() {
                // Segment exhaustion ends the session (round-format path).
                let elapsed = match self.workout.format {
                    Format::TimeCap => self.capped_elapsed(),
                    _ => None,
                };
                return self.finish(false, elapsed);
            }
            let segment = &self.workout.segments[next];
            let secs = sequencer::effective_duration_secs(segment, self.workout.format);
            let active = sequencer::segment_clock_active(segment, self.workout.format);
            // A zero-length segment the clock would drive is degenerate
            // authored data; skip past it instead of stalling a tick on it.
            if secs > 0 || !active {
                break;
            }
            next += 1;
        }

        let (phase, secs, active) = {
            let segment = &self.workout.segments[next];
            (
                segment.phase,
                sequencer::effective_duration_secs(segment, self.workout.format),
                sequencer::segment_clock_active(segment, self.workout.format),
            )
        };

        // Cue the upcoming phase before making it current.
        if matches!(phase, Phase::Work | Phase::Rest) {
            self.cues.phase_transition(phase);
        }

        self.segment_index = next;
        self.segment_remaining_secs = secs;
        self.segment_clock_active = active;
        Some(Event::SegmentAdvanced {
            segment_index: next,
            phase,
            segment_secs: secs,
            at: Utc::now(),
        })
    }

    /// Route a terminal transition through the gate. Only the winning call
    /// produces the SessionEnded event.
    fn finish(&mut self, aborted: bool, elapsed_secs: Option<u32>) -> Option<Event> {
        let outcome = self.gate.fire(self.workout.id, aborted, elapsed_secs)?;
        self.run_state = RunState::Terminal;
        self.wake.release();
        Some(Event::SessionEnded {
            workout_id: outcome.workout_id,
            aborted: outcome.aborted,
            elapsed_secs: outcome.elapsed_secs,
            at: outcome.ended_at,
        })
    }
}

impl Drop for SessionEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cues::CueDispatcher;
    use crate::session::wake::{NoopWakeLock, WakeLockManager};
    use uuid::Uuid;

    fn segment(name: &str, phase: Phase, planned_secs: u32) -> Segment {
        Segment {
            name: name.into(),
            phase,
            planned_secs,
            instructions: String::new(),
            exercises: Vec::new(),
            round_index: None,
            total_rounds: None,
        }
    }

    fn workout(format: Format, total: u32, segments: Vec<Segment>) -> WorkoutDefinition {
        WorkoutDefinition {
            id: Uuid::new_v4(),
            name: "Test".into(),
            format,
            total_duration_secs: total,
            segments,
        }
    }

    fn engine(w: WorkoutDefinition) -> SessionEngine {
        SessionEngine::start(
            w,
            CueDispatcher::silent(),
            WakeLockManager::new(Box::new(NoopWakeLock)),
        )
        .expect("start session")
    }

    #[test]
    fn start_rejects_empty_workout() {
        let w = workout(Format::ClassicRounds, 60, vec![]);
        let err = SessionEngine::start(
            w,
            CueDispatcher::silent(),
            WakeLockManager::new(Box::new(NoopWakeLock)),
        )
        .expect_err("should refuse");
        assert!(matches!(err, SessionError::EmptyWorkout { .. }));
    }

    #[test]
    fn start_rejects_capped_zero_duration() {
        let w = workout(Format::Amrap, 0, vec![segment("w", Phase::Work, 600)]);
        let err = SessionEngine::start(
            w,
            CueDispatcher::silent(),
            WakeLockManager::new(Box::new(NoopWakeLock)),
        )
        .expect_err("should refuse");
        assert!(matches!(err, SessionError::ZeroDuration { .. }));
    }

    #[test]
    fn starts_past_leading_prepare() {
        let w = workout(
            Format::ClassicRounds,
            60,
            vec![segment("prep", Phase::Prepare, 5), segment("w", Phase::Work, 45)],
        );
        let e = engine(w);
        assert_eq!(e.segment_index(), 1);
        assert_eq!(e.segment_remaining_secs(), 45);
        assert_eq!(e.run_state(), RunState::Running);
        assert!(e.wake().is_held());
    }

    #[test]
    fn pause_freezes_and_resume_restores_exact_values() {
        let w = workout(Format::ClassicRounds, 60, vec![segment("w", Phase::Work, 45)]);
        let mut e = engine(w);
        e.tick();
        e.tick();
        assert_eq!(e.segment_remaining_secs(), 43);
        assert_eq!(e.overall_remaining_secs(), 58);

        assert!(e.pause().is_some());
        assert!(!e.wake().is_held());
        assert!(e.tick().is_none());
        assert_eq!(e.segment_remaining_secs(), 43);
        assert_eq!(e.overall_remaining_secs(), 58);

        assert!(e.resume().is_some());
        assert!(e.wake().is_held());
        e.tick();
        assert_eq!(e.segment_remaining_secs(), 42);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let w = workout(Format::ClassicRounds, 60, vec![segment("w", Phase::Work, 45)]);
        let mut e = engine(w);
        assert!(e.pause().is_some());
        assert!(e.pause().is_none());
        assert!(e.resume().is_some());
        assert!(e.resume().is_none());
    }

    #[test]
    fn finish_now_is_rejected_for_round_formats() {
        let w = workout(Format::Emom, 120, vec![segment("w", Phase::Work, 90)]);
        let mut e = engine(w);
        assert!(e.finish_now().is_none());
        assert_eq!(e.run_state(), RunState::Running);
    }

    #[test]
    fn finish_now_reports_spent_time() {
        let w = workout(Format::TimeCap, 600, vec![segment("w", Phase::Work, 600)]);
        let mut e = engine(w);
        for _ in 0..120 {
            e.tick();
        }
        let event = e.finish_now().expect("finish");
        match event {
            Event::SessionEnded { aborted, elapsed_secs, .. } => {
                assert!(!aborted);
                assert_eq!(elapsed_secs, Some(120));
            }
            other => panic!("expected SessionEnded, got {other:?}"),
        }
        assert!(e.is_terminal());
    }

    #[test]
    fn confirm_flow_aborts_once() {
        let w = workout(Format::ClassicRounds, 60, vec![segment("w", Phase::Work, 45)]);
        let mut e = engine(w);
        assert!(e.request_end().is_some());
        assert_eq!(e.run_state(), RunState::ConfirmPending);
        assert!(!e.wake().is_held());
        assert!(e.tick().is_none());

        let event = e.confirm_end().expect("confirm");
        assert!(matches!(event, Event::SessionEnded { aborted: true, .. }));
        assert!(e.confirm_end().is_none());
        assert!(e.request_end().is_none());
    }

    #[test]
    fn cancel_restores_pre_prompt_pause() {
        let w = workout(Format::ClassicRounds, 60, vec![segment("w", Phase::Work, 45)]);
        let mut e = engine(w);
        e.pause();
        e.request_end();
        assert!(e.cancel_end().is_some());
        // Was paused before the prompt: stays paused, lock stays released.
        assert_eq!(e.run_state(), RunState::Paused);
        assert!(!e.wake().is_held());
    }

    #[test]
    fn cancel_restores_running_and_reacquires_lock() {
        let w = workout(Format::ClassicRounds, 60, vec![segment("w", Phase::Work, 45)]);
        let mut e = engine(w);
        e.request_end();
        e.cancel_end();
        assert_eq!(e.run_state(), RunState::Running);
        assert!(e.wake().is_held());
    }

    #[test]
    fn abort_captures_elapsed_when_prompt_opens() {
        let w = workout(Format::TimeCap, 600, vec![segment("w", Phase::Work, 600)]);
        let mut e = engine(w);
        for _ in 0..100 {
            e.tick();
        }
        e.request_end();
        let event = e.confirm_end().expect("confirm");
        match event {
            Event::SessionEnded { aborted, elapsed_secs, .. } => {
                assert!(aborted);
                assert_eq!(elapsed_secs, Some(100));
            }
            other => panic!("expected SessionEnded, got {other:?}"),
        }
    }

    #[test]
    fn round_format_abort_omits_elapsed() {
        let w = workout(Format::ClassicRounds, 60, vec![segment("w", Phase::Work, 45)]);
        let mut e = engine(w);
        e.tick();
        e.request_end();
        let event = e.confirm_end().expect("confirm");
        assert!(matches!(
            event,
            Event::SessionEnded { aborted: true, elapsed_secs: None, .. }
        ));
    }

    #[test]
    fn tick_is_inert_after_terminal() {
        let w = workout(Format::ClassicRounds, 2, vec![segment("w", Phase::Work, 2)]);
        let mut e = engine(w);
        e.tick();
        let ended = e.tick();
        assert!(matches!(ended, Some(Event::SessionEnded { .. })));
        assert!(e.tick().is_none());
        assert!(e.pause().is_none());
    }

    #[test]
    fn teardown_is_idempotent_and_stops_everything() {
        let w = workout(Format::ClassicRounds, 60, vec![segment("w", Phase::Work, 45)]);
        let mut e = engine(w);
        e.teardown();
        e.teardown();
        assert!(!e.wake().is_held());
        assert!(e.tick().is_none());
        assert!(e.pause().is_none());
        assert!(e.request_end().is_none());
    }

    #[test]
    fn hidden_surface_releases_lock_and_regain_reacquires() {
        let w = workout(Format::ClassicRounds, 60, vec![segment("w", Phase::Work, 45)]);
        let mut e = engine(w);
        assert!(e.wake().is_held());
        e.set_visible(false);
        assert!(!e.wake().is_held());
        e.set_visible(true);
        assert!(e.wake().is_held());
    }

    #[test]
    fn amrap_work_segment_is_display_only() {
        let w = workout(Format::Amrap, 600, vec![segment("w", Phase::Work, 600)]);
        let mut e = engine(w);
        e.tick();
        e.tick();
        // Overall ticks, segment display value stays put.
        assert_eq!(e.overall_remaining_secs(), 598);
        assert_eq!(e.segment_remaining_secs(), 600);
    }

    #[test]
    fn overall_expiry_is_inert_for_round_formats() {
        // Authored overall shorter than the segments: round formats must
        // not terminate on it.
        let w = workout(Format::ClassicRounds, 3, vec![segment("w", Phase::Work, 10)]);
        let mut e = engine(w);
        for _ in 0..5 {
            assert!(e.tick().is_none());
        }
        assert_eq!(e.run_state(), RunState::Running);
        assert_eq!(e.overall_remaining_secs(), 0);
        assert_eq!(e.segment_remaining_secs(), 5);
    }

    #[test]
    fn zero_length_rest_is_skipped() {
        let w = workout(
            Format::ClassicRounds,
            90,
            vec![
                segment("w1", Phase::Work, 2),
                segment("r", Phase::Rest, 0),
                segment("w2", Phase::Work, 45),
            ],
        );
        let mut e = engine(w);
        e.tick();
        let event = e.tick();
        match event {
            Some(Event::SegmentAdvanced { segment_index, .. }) => assert_eq!(segment_index, 2),
            other => panic!("expected SegmentAdvanced, got {other:?}"),
        }
    }
}
