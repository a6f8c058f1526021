//! Shared helpers for CLI commands.

use std::path::PathBuf;

use wodclock_core::error::{CoreError, Result};
use wodclock_core::workout::WorkoutDefinition;

use crate::presets;

/// Resolve a workout from a preset name or a JSON definition file.
pub fn load_workout(preset: Option<String>, file: Option<PathBuf>) -> Result<WorkoutDefinition> {
    match (preset, file) {
        (Some(name), None) => presets::by_name(&name).ok_or_else(|| {
            CoreError::Custom(format!(
                "unknown preset '{name}' (available: {})",
                presets::names().join(", ")
            ))
        }),
        (None, Some(path)) => {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        _ => Err(CoreError::Custom(
            "provide exactly one of --preset or --file".into(),
        )),
    }
}

/// `mm:ss` rendering for countdown values.
pub fn format_mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
