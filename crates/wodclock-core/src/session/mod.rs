mod completion;
mod engine;
pub mod sequencer;
mod wake;

pub use completion::{CompletionGate, SessionOutcome};
pub use engine::{RunState, SessionEngine};
pub use wake::{NoopWakeLock, WakeAction, WakeLock, WakeLockError, WakeLockManager, WakeLockRecord};
