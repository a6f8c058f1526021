//! Terminal gate: a session ends exactly once.
//!
//! Every path out of a session -- segment exhaustion, overall expiry,
//! explicit finish, confirmed abort -- funnels through [`CompletionGate`].
//! The first `fire` wins and produces the outcome; everything after it is
//! a no-op, so coincident expiry signals cannot double-terminate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single terminal result of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub workout_id: Uuid,
    pub aborted: bool,
    /// Actual time spent, reported by capped formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_secs: Option<u32>,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct CompletionGate {
    outcome: Option<SessionOutcome>,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// Record the terminal outcome. Returns it only for the winning call;
    /// later calls return None and change nothing.
    pub fn fire(
        &mut self,
        workout_id: Uuid,
        aborted: bool,
        elapsed_secs: Option<u32>,
    ) -> Option<SessionOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        let outcome = SessionOutcome {
            workout_id,
            aborted,
            elapsed_secs,
            ended_at: Utc::now(),
        };
        self.outcome = Some(outcome.clone());
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fire_wins() {
        let id = Uuid::new_v4();
        let mut gate = CompletionGate::new();
        assert!(!gate.is_terminal());

        let outcome = gate.fire(id, false, Some(120)).expect("first fire");
        assert_eq!(outcome.workout_id, id);
        assert!(!outcome.aborted);
        assert_eq!(outcome.elapsed_secs, Some(120));
        assert!(gate.is_terminal());
    }

    #[test]
    fn second_fire_is_a_noop() {
        let id = Uuid::new_v4();
        let mut gate = CompletionGate::new();
        gate.fire(id, false, None);

        assert!(gate.fire(id, true, Some(5)).is_none());
        let outcome = gate.outcome().unwrap();
        assert!(!outcome.aborted);
        assert_eq!(outcome.elapsed_secs, None);
    }
}
