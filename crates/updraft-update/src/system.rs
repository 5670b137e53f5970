//! Operating system side effects of finishing an install
//!
//! Opening the release page and asking the process to terminate are kept
//! behind [`SystemHooks`] so tests and embedding applications can observe
//! or replace them.

use std::io;
use std::process::Command;
use tracing::debug;

/// Side effects performed after an install
pub trait SystemHooks: Send + Sync {
    /// Open a URL in the user's browser
    fn open_url(&self, url: &str) -> io::Result<()>;

    /// Ask the running process to shut down gracefully
    fn request_termination(&self) -> io::Result<()>;
}

/// Hooks backed by the host operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSystem;

impl SystemHooks for NativeSystem {
    fn open_url(&self, url: &str) -> io::Result<()> {
        debug!("Opening {}", url);

        #[cfg(target_os = "macos")]
        let mut command = {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        };

        #[cfg(target_os = "windows")]
        let mut command = {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        };

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let mut command = {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        };

        command.spawn().map(|_| ())
    }

    fn request_termination(&self) -> io::Result<()> {
        terminate_self()
    }
}

#[cfg(unix)]
fn terminate_self() -> io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    debug!("Sending SIGTERM to own process");
    kill(Pid::this(), Signal::SIGTERM).map_err(io::Error::from)
}

#[cfg(not(unix))]
fn terminate_self() -> io::Result<()> {
    debug!("Exiting process");
    std::process::exit(0)
}
