//! Terminal rendering of update events

use indicatif::ProgressBar;
use std::sync::Mutex;
use updraft_update::download::human_readable_size;
use updraft_update::{EventSink, ToastKind, UpdateEvent};

use crate::output;

/// Event sink printing toasts and drawing a download progress bar
#[derive(Debug, Default)]
pub struct TerminalSink {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_bar(&self) {
        if let Some(bar) = self.bar.lock().unwrap_or_else(|e| e.into_inner()).take() {
            bar.finish_and_clear();
        }
    }
}

impl EventSink for TerminalSink {
    fn publish(&self, event: UpdateEvent) {
        match event {
            UpdateEvent::Toast { kind, message, .. } => {
                self.clear_bar();
                match kind {
                    ToastKind::Success => output::success(&message),
                    ToastKind::Error => output::error(&message),
                }
            }
            UpdateEvent::CheckDone { version, .. } => {
                output::kv("Latest", &version);
            }
            UpdateEvent::DownloadProgress {
                total_size,
                downloaded_size,
            } => {
                let mut bar = self.bar.lock().unwrap_or_else(|e| e.into_inner());
                bar.get_or_insert_with(|| output::download_bar(total_size, "Downloading"))
                    .set_position(downloaded_size);
            }
            UpdateEvent::DownloadDone { total_size } => {
                self.clear_bar();
                output::kv("Downloaded", &human_readable_size(total_size));
            }
            UpdateEvent::DownloadError { .. } | UpdateEvent::InstallFailed { .. } => {
                self.clear_bar();
            }
            UpdateEvent::RestartRequired => {
                output::info("Restart the application to finish the update");
            }
        }
    }
}
