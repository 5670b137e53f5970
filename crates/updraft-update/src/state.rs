//! Shared updater state
//!
//! Status, the extracting flag and the cached running version live behind a
//! single mutex. Critical sections are short and never await.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Position of the application in the update lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    #[default]
    Idle,
    UpdateAvailable,
    Downloading,
    Downloaded,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::UpdateAvailable => "update available",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
struct Guarded {
    status: UpdateStatus,
    extracting: bool,
    version: String,
}

/// Mutex-guarded state shared by every orchestrator task
#[derive(Debug)]
pub struct SharedState {
    inner: Mutex<Guarded>,
}

impl SharedState {
    /// Create idle state for the given running version
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Guarded {
                status: UpdateStatus::Idle,
                extracting: false,
                version: version.into(),
            }),
        }
    }

    // A panicking task cannot leave the guarded fields half-written, so a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Guarded> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current status
    pub fn status(&self) -> UpdateStatus {
        self.lock().status
    }

    /// Replace the status
    pub fn set_status(&self, status: UpdateStatus) {
        self.lock().status = status;
    }

    /// Replace the status only when it currently is one of `from`
    ///
    /// Returns whether the status changed.
    pub fn transition(&self, from: &[UpdateStatus], to: UpdateStatus) -> bool {
        let mut guard = self.lock();
        if from.contains(&guard.status) {
            guard.status = to;
            true
        } else {
            false
        }
    }

    /// Cached running version
    pub fn version(&self) -> String {
        self.lock().version.clone()
    }

    /// Replace the cached running version
    pub fn set_version(&self, version: impl Into<String>) {
        self.lock().version = version.into();
    }

    /// Whether an install is in progress
    pub fn is_extracting(&self) -> bool {
        self.lock().extracting
    }

    /// Atomically claim the extracting flag
    ///
    /// Returns `None` when an install is already in progress. The flag is
    /// released when the returned guard is dropped.
    pub fn try_begin_extracting(self: &Arc<Self>) -> Option<ExtractingGuard> {
        let mut guard = self.lock();
        if guard.extracting {
            return None;
        }
        guard.extracting = true;
        Some(ExtractingGuard {
            state: Arc::clone(self),
        })
    }
}

/// Holds the extracting flag; clears it on drop
#[derive(Debug)]
pub struct ExtractingGuard {
    state: Arc<SharedState>,
}

impl Drop for ExtractingGuard {
    fn drop(&mut self) {
        self.state.lock().extracting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SharedState::new("v1.0.0");
        assert_eq!(state.status(), UpdateStatus::Idle);
        assert!(!state.is_extracting());
        assert_eq!(state.version(), "v1.0.0");
    }

    #[test]
    fn test_extracting_guard_is_exclusive() {
        let state = Arc::new(SharedState::new("v1.0.0"));

        let first = state.try_begin_extracting();
        assert!(first.is_some());
        assert!(state.is_extracting());
        assert!(state.try_begin_extracting().is_none());

        drop(first);
        assert!(!state.is_extracting());
        assert!(state.try_begin_extracting().is_some());
    }

    #[test]
    fn test_extracting_cleared_after_panic() {
        let state = Arc::new(SharedState::new("v1.0.0"));
        let state_clone = Arc::clone(&state);

        let result = std::thread::spawn(move || {
            let _guard = state_clone.try_begin_extracting();
            panic!("install blew up");
        })
        .join();

        assert!(result.is_err());
        assert!(!state.is_extracting());
    }

    #[test]
    fn test_transition_only_from_allowed_states() {
        let state = SharedState::new("v1.0.0");
        let open = [UpdateStatus::Idle, UpdateStatus::UpdateAvailable];

        assert!(state.transition(&open, UpdateStatus::UpdateAvailable));
        assert_eq!(state.status(), UpdateStatus::UpdateAvailable);

        state.set_status(UpdateStatus::Downloading);
        assert!(!state.transition(&open, UpdateStatus::UpdateAvailable));
        assert_eq!(state.status(), UpdateStatus::Downloading);
    }

    #[test]
    fn test_set_version() {
        let state = SharedState::new("v1.0.0");
        state.set_version("v1.1.0");
        assert_eq!(state.version(), "v1.1.0");
    }
}
