//! Recording implementations of the orchestrator's collaborators

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use updraft_update::events::{EventSink, ToastKind, UpdateEvent};
use updraft_update::system::SystemHooks;

/// Event sink keeping every published event
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<UpdateEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events published so far
    pub fn events(&self) -> Vec<UpdateEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Messages of toasts of the given kind
    pub fn toasts(&self, kind: ToastKind) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UpdateEvent::Toast {
                    kind: k, message, ..
                } if k == kind => Some(message),
                _ => None,
            })
            .collect()
    }

    /// `(total, downloaded)` of every progress event
    pub fn progress(&self) -> Vec<(u64, u64)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UpdateEvent::DownloadProgress {
                    total_size,
                    downloaded_size,
                } => Some((total_size, downloaded_size)),
                _ => None,
            })
            .collect()
    }

    /// Number of events matching `predicate`
    pub fn count(&self, predicate: impl Fn(&UpdateEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for EventLog {
    fn publish(&self, event: UpdateEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// System hooks that record requests instead of acting on them
#[derive(Debug, Clone, Default)]
pub struct RecordingSystem {
    opened: Arc<Mutex<Vec<String>>>,
    terminations: Arc<AtomicUsize>,
}

impl RecordingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs opened so far
    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    /// Number of termination requests
    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

impl SystemHooks for RecordingSystem {
    fn open_url(&self, url: &str) -> io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn request_termination(&self) -> io::Result<()> {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
