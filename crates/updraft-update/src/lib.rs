//! Self-update orchestration for Updraft-hosted applications
//!
//! Provides:
//! - Version comparison of `vMAJOR.MINOR.PATCH` tags
//! - Latest-release lookup and platform asset selection
//! - Streaming artifact download with progress events
//! - In-place archive installs with backup and rollback
//! - Package hand-off installs for platforms with native installers
//! - An orchestrator tying the above to a UI through events

pub mod cleanup;
pub mod download;
pub mod error;
pub mod events;
pub mod installer;
pub mod orchestrator;
pub mod releases;
pub mod state;
pub mod system;
pub mod version;

pub use download::{DownloadProgress, DownloadResult, UpdateDownloader};
pub use error::{Result, UpdateError};
pub use events::{ChannelSink, EventSink, ToastKind, TracingSink, UpdateEvent};
pub use installer::{InstallOutcome, Installer};
pub use orchestrator::{CheckOutcome, UpdateOrchestrator, UpdateOrchestratorBuilder};
pub use releases::{ReleaseAsset, ReleaseFeedClient, ReleaseInfo};
pub use state::UpdateStatus;
pub use system::{NativeSystem, SystemHooks};
pub use version::{is_newer, ReleaseVersion};
