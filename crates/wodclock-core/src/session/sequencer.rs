//! Start-position and duration rules.
//!
//! Formats override the authored data: Emom forces every work segment to
//! one minute, capped formats hand their work segments to the overall
//! clock. These rules apply at session start and again at every segment
//! transition.

use crate::workout::{Format, Phase, Segment};

/// Effective duration of an Emom work segment, regardless of authored value.
pub const EMOM_WORK_SECS: u32 = 60;

/// Compute the starting segment index and its effective duration.
///
/// A leading prepare segment is skipped when more than one segment exists:
/// the caller is assumed to have already run the pre-session countdown, and
/// starting on the real first segment avoids a double count-in.
pub fn starting_position(segments: &[Segment], format: Format) -> (usize, u32) {
    let start = if segments.len() > 1 && segments[0].phase == Phase::Prepare {
        1
    } else {
        0
    };
    (start, effective_duration_secs(&segments[start], format))
}

/// Authored duration with the format override applied.
pub fn effective_duration_secs(segment: &Segment, format: Format) -> u32 {
    match (format, segment.phase) {
        (Format::Emom, Phase::Work) => EMOM_WORK_SECS,
        _ => segment.planned_secs,
    }
}

/// Whether the segment clock actively decrements for this segment.
///
/// Amrap/TimeCap work segments are driven purely by the overall clock; the
/// segment clock holds the stored duration for display only.
pub fn segment_clock_active(segment: &Segment, format: Format) -> bool {
    match (format, segment.phase) {
        (_, Phase::Prepare) => true,
        (Format::ClassicRounds | Format::Emom, _) => true,
        (Format::TimeCap, Phase::Rest) => segment.planned_secs > 0,
        (Format::Amrap | Format::TimeCap, _) => false,
    }
}
