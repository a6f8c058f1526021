//! Built-in sample workouts, one per format.
//!
//! These stand in for the external workout catalogue so the CLI is usable
//! on its own. The engine treats them exactly like any other definition.

use uuid::Uuid;
use wodclock_core::workout::{
    Exercise, Format, Phase, Quantity, Segment, WorkoutDefinition,
};

pub fn names() -> Vec<&'static str> {
    vec!["classic", "emom", "amrap", "timecap"]
}

pub fn by_name(name: &str) -> Option<WorkoutDefinition> {
    match name {
        "classic" => Some(classic_rounds()),
        "emom" => Some(emom()),
        "amrap" => Some(amrap()),
        "timecap" => Some(time_cap()),
        _ => None,
    }
}

fn prepare(secs: u32) -> Segment {
    Segment {
        name: "Get Ready".into(),
        phase: Phase::Prepare,
        planned_secs: secs,
        instructions: "Find your space and set up".into(),
        exercises: Vec::new(),
        round_index: None,
        total_rounds: None,
    }
}

fn exercise(name: &str, quantity: Quantity, cue: &str) -> Exercise {
    Exercise {
        name: name.into(),
        quantity,
        cue: cue.into(),
    }
}

/// Three rounds of bodyweight work with short rests.
pub fn classic_rounds() -> WorkoutDefinition {
    let mut segments = vec![prepare(10)];
    for round in 1..=3u32 {
        segments.push(Segment {
            name: format!("Round {round}"),
            phase: Phase::Work,
            planned_secs: 40,
            instructions: "Move with control".into(),
            exercises: vec![
                exercise("Squats", Quantity::Reps(15), "Chest up"),
                exercise("Push-ups", Quantity::Reps(10), "Elbows tight"),
            ],
            round_index: Some(round),
            total_rounds: Some(3),
        });
        segments.push(Segment {
            name: "Rest".into(),
            phase: Phase::Rest,
            planned_secs: 20,
            instructions: "Shake it out".into(),
            exercises: Vec::new(),
            round_index: Some(round),
            total_rounds: Some(3),
        });
    }
    WorkoutDefinition {
        id: Uuid::new_v4(),
        name: "Full Body Rounds".into(),
        format: Format::ClassicRounds,
        total_duration_secs: 10 + 3 * 60,
        segments,
    }
}

/// Ten minutes, one movement at the top of each.
pub fn emom() -> WorkoutDefinition {
    let movements = [
        ("Burpees", Quantity::Reps(8)),
        ("Lunges", Quantity::Reps(12)),
    ];
    let mut segments = vec![prepare(10)];
    for minute in 1..=10u32 {
        let (name, quantity) = movements[(minute as usize - 1) % movements.len()];
        segments.push(Segment {
            name: format!("Minute {minute}"),
            phase: Phase::Work,
            // Authored as the intended work window; the format forces each
            // segment to a full minute at runtime.
            planned_secs: 45,
            instructions: "Start at the top of the minute, rest what remains".into(),
            exercises: vec![exercise(name, quantity, "Steady pace")],
            round_index: Some(minute),
            total_rounds: Some(10),
        });
    }
    WorkoutDefinition {
        id: Uuid::new_v4(),
        name: "EMOM 10".into(),
        format: Format::Emom,
        total_duration_secs: 10 + 10 * 60,
        segments,
    }
}

/// As many rounds as possible in twelve minutes.
pub fn amrap() -> WorkoutDefinition {
    WorkoutDefinition {
        id: Uuid::new_v4(),
        name: "AMRAP 12".into(),
        format: Format::Amrap,
        total_duration_secs: 720,
        segments: vec![
            prepare(10),
            Segment {
                name: "AMRAP".into(),
                phase: Phase::Work,
                planned_secs: 720,
                instructions: "Cycle the movements until the clock runs out".into(),
                exercises: vec![
                    exercise("Kettlebell swings", Quantity::Reps(15), "Hips drive"),
                    exercise("Sit-ups", Quantity::Reps(10), "Full range"),
                    exercise("Plank", Quantity::Seconds(30), "Flat back"),
                ],
                round_index: None,
                total_rounds: None,
            },
        ],
    }
}

/// A fixed task against a ten minute cap.
pub fn time_cap() -> WorkoutDefinition {
    WorkoutDefinition {
        id: Uuid::new_v4(),
        name: "For Time (10:00 cap)".into(),
        format: Format::TimeCap,
        total_duration_secs: 600,
        segments: vec![
            prepare(10),
            Segment {
                name: "For Time".into(),
                phase: Phase::Work,
                planned_secs: 600,
                instructions: "50-40-30 reps, finish as fast as you can".into(),
                exercises: vec![
                    exercise("Jumping jacks", Quantity::Reps(50), "Light feet"),
                    exercise("Mountain climbers", Quantity::Reps(40), "Knees high"),
                    exercise("Squats", Quantity::Reps(30), "Depth first"),
                ],
                round_index: None,
                total_rounds: None,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wodclock_core::session::sequencer;

    #[test]
    fn every_name_resolves() {
        for name in names() {
            assert!(by_name(name).is_some(), "preset {name} missing");
        }
    }

    #[test]
    fn classic_total_matches_overall_clock() {
        // Round formats author the overall duration to coincide with the
        // sum of segment durations.
        let w = classic_rounds();
        assert_eq!(w.planned_total_secs(), w.total_duration_secs);
    }

    #[test]
    fn emom_total_matches_forced_minutes() {
        let w = emom();
        let effective: u32 = w
            .segments
            .iter()
            .map(|s| sequencer::effective_duration_secs(s, w.format))
            .sum();
        assert_eq!(effective, w.total_duration_secs);
    }

    #[test]
    fn amrap_work_spans_the_whole_session() {
        let w = amrap();
        let work = w.segments.iter().find(|s| s.phase == Phase::Work).unwrap();
        assert_eq!(work.planned_secs, w.total_duration_secs);
    }
}
