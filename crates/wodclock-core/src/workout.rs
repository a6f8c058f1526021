//! Workout definitions: formats, phases, segments.
//!
//! A [`WorkoutDefinition`] is the immutable input to a session. It is
//! produced by an external catalogue/generator and never mutated by the
//! engine -- format rules may *override* authored durations at runtime
//! (see [`crate::session::sequencer`]), but the definition itself stays
//! as authored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// High-level timing rule-set for a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Alternating work/rest segments repeated for rounds.
    ClassicRounds,
    /// Every work segment is exactly one minute, content packed inside it.
    Emom,
    /// As many rounds as possible within one overall timer.
    Amrap,
    /// A task completed for time within a maximum allotted duration.
    TimeCap,
}

impl Format {
    /// Formats terminated by the overall clock (or an explicit finish)
    /// rather than by segment exhaustion.
    pub fn is_capped(self) -> bool {
        matches!(self, Format::Amrap | Format::TimeCap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Prepare,
    Work,
    Rest,
}

/// Prescribed amount for an exercise: a rep count or a hold/duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Reps(u32),
    Seconds(u32),
}

/// An exercise embedded in a segment (informational -- the engine times
/// segments, not individual exercises).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub quantity: Quantity,
    #[serde(default)]
    pub cue: String,
}

/// One named timed phase of a workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub phase: Phase,
    /// Authored duration in seconds. Formats may override this at runtime.
    pub planned_secs: u32,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    /// 1-based round number, informational only (ClassicRounds/Emom).
    #[serde(default)]
    pub round_index: Option<u32>,
    #[serde(default)]
    pub total_rounds: Option<u32>,
}

/// Immutable description of a workout: format, total duration, ordered
/// segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutDefinition {
    pub id: Uuid,
    pub name: String,
    pub format: Format,
    /// Overall session duration in seconds. For round formats this is
    /// authored to coincide with the sum of segment durations, but the
    /// engine does not depend on that coincidence.
    pub total_duration_secs: u32,
    pub segments: Vec<Segment>,
}

impl WorkoutDefinition {
    /// Sum of authored segment durations in seconds.
    ///
    /// Uses saturating arithmetic so absurd authored values cannot overflow.
    pub fn planned_total_secs(&self) -> u32 {
        self.segments
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.planned_secs))
    }

    pub fn work_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.phase == Phase::Work)
            .count()
    }

    /// Authored seconds completed up to (but not including) `segment_index`.
    pub fn cumulative_secs(&self, segment_index: usize) -> u32 {
        self.segments
            .iter()
            .take(segment_index)
            .fold(0u32, |acc, s| acc.saturating_add(s.planned_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(phase: Phase, planned_secs: u32) -> Segment {
        Segment {
            name: "seg".into(),
            phase,
            planned_secs,
            instructions: String::new(),
            exercises: Vec::new(),
            round_index: None,
            total_rounds: None,
        }
    }

    fn workout(format: Format, segments: Vec<Segment>) -> WorkoutDefinition {
        WorkoutDefinition {
            id: Uuid::new_v4(),
            name: "Sample".into(),
            format,
            total_duration_secs: 600,
            segments,
        }
    }

    #[test]
    fn planned_total_sums_segments() {
        let w = workout(
            Format::ClassicRounds,
            vec![
                segment(Phase::Prepare, 10),
                segment(Phase::Work, 45),
                segment(Phase::Rest, 15),
            ],
        );
        assert_eq!(w.planned_total_secs(), 70);
    }

    #[test]
    fn work_count_ignores_other_phases() {
        let w = workout(
            Format::ClassicRounds,
            vec![
                segment(Phase::Prepare, 10),
                segment(Phase::Work, 45),
                segment(Phase::Rest, 15),
                segment(Phase::Work, 45),
            ],
        );
        assert_eq!(w.work_count(), 2);
    }

    #[test]
    fn cumulative_secs_excludes_current() {
        let w = workout(
            Format::ClassicRounds,
            vec![
                segment(Phase::Work, 45),
                segment(Phase::Rest, 15),
                segment(Phase::Work, 45),
            ],
        );
        assert_eq!(w.cumulative_secs(0), 0);
        assert_eq!(w.cumulative_secs(2), 60);
    }

    #[test]
    fn format_capped_split() {
        assert!(Format::Amrap.is_capped());
        assert!(Format::TimeCap.is_capped());
        assert!(!Format::ClassicRounds.is_capped());
        assert!(!Format::Emom.is_capped());
    }

    #[test]
    fn segment_deserializes_with_defaults() {
        let json = r#"{"name":"Burpees","phase":"work","planned_secs":45}"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert!(seg.exercises.is_empty());
        assert!(seg.round_index.is_none());
    }

    #[test]
    fn unknown_format_is_rejected_at_parse() {
        let json = r#"{"id":"4a3f9c2e-1d5b-4c7a-9e8f-0a1b2c3d4e5f","name":"x","format":"tabata","total_duration_secs":60,"segments":[]}"#;
        assert!(serde_json::from_str::<WorkoutDefinition>(json).is_err());
    }
}
