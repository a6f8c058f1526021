//! Best-effort screen wake lock management.
//!
//! The wake lock is a platform nicety, never a correctness concern: every
//! acquisition or release failure is recorded and otherwise ignored.
//! Policy: hold the lock while the session is running and the host surface
//! is visible; release it on pause, on the end-confirmation prompt, when
//! the surface hides, and unconditionally on teardown. The platform may
//! silently revoke the lock while hidden, so visibility regained while
//! running re-acquires.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WakeLockError {
    /// Capability absent on this platform.
    #[error("wake lock capability not available")]
    Unavailable,

    #[error("wake lock request denied: {0}")]
    Denied(String),
}

/// Host-provided platform collaborator. Both calls are individually
/// fallible; the manager absorbs every failure.
pub trait WakeLock {
    fn request(&mut self) -> Result<(), WakeLockError>;
    fn release(&mut self) -> Result<(), WakeLockError>;
}

/// Lock for hosts without the capability. Always succeeds, holds nothing.
#[derive(Debug, Default)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn request(&mut self) -> Result<(), WakeLockError> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeAction {
    Acquire,
    Release,
}

/// One acquire/release attempt with its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeLockRecord {
    pub action: WakeAction,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

/// Idempotent policy wrapper around a host [`WakeLock`].
pub struct WakeLockManager {
    lock: Box<dyn WakeLock>,
    enabled: bool,
    held: bool,
    visible: bool,
    log: Vec<WakeLockRecord>,
}

impl std::fmt::Debug for WakeLockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WakeLockManager")
            .field("enabled", &self.enabled)
            .field("held", &self.held)
            .field("visible", &self.visible)
            .field("log_len", &self.log.len())
            .finish()
    }
}

impl WakeLockManager {
    pub fn new(lock: Box<dyn WakeLock>) -> Self {
        Self {
            lock,
            enabled: true,
            held: false,
            visible: true,
            log: Vec::new(),
        }
    }

    /// Manager that never acquires (user turned the feature off).
    pub fn disabled() -> Self {
        Self {
            lock: Box::new(NoopWakeLock),
            enabled: false,
            held: false,
            visible: true,
            log: Vec::new(),
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn log(&self) -> &[WakeLockRecord] {
        &self.log
    }

    /// Apply the hold policy for the current engine state.
    pub fn sync(&mut self, running: bool) {
        if running && self.visible {
            self.acquire();
        } else {
            self.release();
        }
    }

    /// Visibility signal from the host surface.
    pub fn set_visible(&mut self, visible: bool, running: bool) {
        self.visible = visible;
        // The platform may have revoked the lock while hidden; treat it as
        // not held so a regained surface re-requests.
        if !visible {
            self.release();
        }
        self.sync(running);
    }

    /// Idempotent acquire. Failures are recorded, never raised.
    pub fn acquire(&mut self) {
        if !self.enabled || self.held {
            return;
        }
        match self.lock.request() {
            Ok(()) => {
                self.held = true;
                self.record(WakeAction::Acquire, true, None);
            }
            Err(e) => self.record(WakeAction::Acquire, false, Some(e.to_string())),
        }
    }

    /// Idempotent release. The lock is considered dropped even when the
    /// platform call fails.
    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        match self.lock.release() {
            Ok(()) => self.record(WakeAction::Release, true, None),
            Err(e) => self.record(WakeAction::Release, false, Some(e.to_string())),
        }
    }

    fn record(&mut self, action: WakeAction, ok: bool, detail: Option<String>) {
        self.log.push(WakeLockRecord {
            action,
            ok,
            detail,
            at: Utc::now(),
        });
    }
}
