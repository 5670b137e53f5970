//! Update events and event sinks
//!
//! The orchestrator reports everything the UI needs to know through an
//! [`EventSink`]. Sinks are called from whatever task produced the event,
//! so implementations must not assume a particular thread.
//!
//! Three sinks are provided:
//! - any `Fn(UpdateEvent) + Send + Sync` closure
//! - [`ChannelSink`], which forwards into an unbounded tokio channel
//! - [`TracingSink`], which only logs

use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

/// Event published by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateEvent {
    /// Transient user notification
    Toast {
        kind: ToastKind,
        message: String,
        duration: Duration,
    },

    /// A check found a newer release
    CheckDone { new_version: bool, version: String },

    /// Download advanced but is not yet complete
    DownloadProgress { total_size: u64, downloaded_size: u64 },

    /// Download finished successfully
    DownloadDone { total_size: u64 },

    /// Download failed
    DownloadError { message: String },

    /// Files were replaced and the application must restart
    RestartRequired,

    /// In-place install failed and was rolled back
    InstallFailed { message: String },
}

impl UpdateEvent {
    /// Success toast
    pub fn success(message: impl Into<String>, duration: Duration) -> Self {
        Self::Toast {
            kind: ToastKind::Success,
            message: message.into(),
            duration,
        }
    }

    /// Error toast
    pub fn error(message: impl Into<String>, duration: Duration) -> Self {
        Self::Toast {
            kind: ToastKind::Error,
            message: message.into(),
            duration,
        }
    }
}

/// Receiver of update events
pub trait EventSink: Send + Sync {
    /// Deliver one event
    fn publish(&self, event: UpdateEvent);
}

impl<F> EventSink for F
where
    F: Fn(UpdateEvent) + Send + Sync,
{
    fn publish(&self, event: UpdateEvent) {
        self(event)
    }
}

/// Sink forwarding events into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<UpdateEvent>,
}

impl EventSink for ChannelSink {
    fn publish(&self, event: UpdateEvent) {
        if self.sender.send(event).is_err() {
            debug!("Event receiver dropped; discarding event");
        }
    }
}

/// Create a channel sink and its receiving half
pub fn channel() -> (ChannelSink, mpsc::UnboundedReceiver<UpdateEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelSink { sender }, receiver)
}

/// Sink that only logs events
///
/// # Log Levels
///
/// - progress: DEBUG
/// - error toasts, download and install failures: ERROR
/// - everything else: INFO
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: UpdateEvent) {
        match event {
            UpdateEvent::Toast {
                kind: ToastKind::Success,
                message,
                ..
            } => info!("{}", message),
            UpdateEvent::Toast {
                kind: ToastKind::Error,
                message,
                ..
            } => error!("{}", message),
            UpdateEvent::CheckDone { version, .. } => info!("Update available: {}", version),
            UpdateEvent::DownloadProgress {
                total_size,
                downloaded_size,
            } => debug!("Downloaded {}/{} bytes", downloaded_size, total_size),
            UpdateEvent::DownloadDone { total_size } => {
                info!("Download complete ({} bytes)", total_size)
            }
            UpdateEvent::DownloadError { message } => error!("Download failed: {}", message),
            UpdateEvent::RestartRequired => info!("Restart required to finish the update"),
            UpdateEvent::InstallFailed { message } => error!("Install failed: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let sink = move |event: UpdateEvent| seen_clone.lock().unwrap().push(event);

        sink.publish(UpdateEvent::RestartRequired);
        assert_eq!(*seen.lock().unwrap(), vec![UpdateEvent::RestartRequired]);
    }

    #[tokio::test]
    async fn test_channel_sink() {
        let (sink, mut rx) = channel();
        sink.publish(UpdateEvent::DownloadDone { total_size: 42 });
        assert_eq!(
            rx.recv().await,
            Some(UpdateEvent::DownloadDone { total_size: 42 })
        );
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = channel();
        drop(rx);
        sink.publish(UpdateEvent::RestartRequired);
    }

    #[test]
    fn test_event_serialization() {
        let event = UpdateEvent::CheckDone {
            new_version: true,
            version: "v9.9.9".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "check_done");
        assert_eq!(json["version"], "v9.9.9");
    }
}
