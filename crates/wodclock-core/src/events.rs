use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::RunState;
use crate::workout::Phase;

/// Every state change in the engine produces an Event.
/// Hosts poll for events (the CLI prints them as JSON); the results
/// collaborator consumes the single terminal `SessionEnded`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SegmentAdvanced {
        segment_index: usize,
        phase: Phase,
        segment_secs: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        segment_remaining_secs: u32,
        overall_remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionResumed {
        segment_remaining_secs: u32,
        overall_remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// User asked to end the session; clocks frozen pending confirmation.
    EndRequested {
        at: DateTime<Utc>,
    },
    /// User dismissed the end confirmation; clocks resume unchanged.
    EndCancelled {
        at: DateTime<Utc>,
    },
    /// The single terminal result. Emitted exactly once per session.
    SessionEnded {
        workout_id: Uuid,
        aborted: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        elapsed_secs: Option<u32>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        run_state: RunState,
        segment_index: usize,
        phase: Phase,
        segment_name: String,
        segment_remaining_secs: u32,
        overall_remaining_secs: u32,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
