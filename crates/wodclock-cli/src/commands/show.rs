use std::path::PathBuf;

use clap::Args;
use wodclock_core::error::Result;
use wodclock_core::session::sequencer;
use wodclock_core::workout::Format;

use crate::common::{format_mmss, load_workout};

#[derive(Args)]
pub struct ShowArgs {
    /// Built-in preset name
    #[arg(long, conflicts_with = "file")]
    preset: Option<String>,
    /// Path to a workout definition JSON file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Print the raw definition as JSON
    #[arg(long)]
    json: bool,
}

fn format_label(format: Format) -> &'static str {
    match format {
        Format::ClassicRounds => "classic rounds",
        Format::Emom => "EMOM",
        Format::Amrap => "AMRAP",
        Format::TimeCap => "time cap",
    }
}

pub fn run(args: ShowArgs) -> Result<()> {
    let workout = load_workout(args.preset, args.file)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&workout)?);
        return Ok(());
    }

    println!(
        "{} — {} — overall {}",
        workout.name,
        format_label(workout.format),
        format_mmss(workout.total_duration_secs)
    );

    let (start_index, _) = sequencer::starting_position(&workout.segments, workout.format);
    for (index, segment) in workout.segments.iter().enumerate() {
        let effective = sequencer::effective_duration_secs(segment, workout.format);
        let mut notes: Vec<&str> = Vec::new();
        if index < start_index {
            notes.push("skipped (pre-session countdown already ran)");
        }
        if effective != segment.planned_secs {
            notes.push("duration forced by format");
        }
        if !sequencer::segment_clock_active(segment, workout.format) && index >= start_index {
            notes.push("driven by overall clock");
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!("  [{}]", notes.join("; "))
        };
        println!(
            "  {index:>2}. {:<7} {:<16} {}{notes}",
            format!("{:?}", segment.phase).to_lowercase(),
            segment.name,
            format_mmss(effective),
        );
        for exercise in &segment.exercises {
            let quantity = match exercise.quantity {
                wodclock_core::workout::Quantity::Reps(n) => format!("{n} reps"),
                wodclock_core::workout::Quantity::Seconds(s) => format_mmss(s),
            };
            println!("        - {} ({quantity})", exercise.name);
        }
    }
    Ok(())
}
