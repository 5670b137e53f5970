//! Best-effort filesystem steps
//!
//! Backup handling and rollback are sequences of independent steps where a
//! failing step must not stop the ones after it. [`BestEffort`] runs each
//! step, logs the failure and moves on.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Named sequence of independent fallible steps
#[derive(Debug)]
pub struct BestEffort {
    /// Label used in log messages
    label: &'static str,

    /// Number of steps that failed
    failures: usize,
}

impl BestEffort {
    /// Start a new sequence
    pub fn new(label: &'static str) -> Self {
        Self { label, failures: 0 }
    }

    /// Run an arbitrary step
    pub fn step<F>(&mut self, description: &str, op: F) -> &mut Self
    where
        F: FnOnce() -> io::Result<()>,
    {
        match op() {
            Ok(()) => debug!("{}: {}", self.label, description),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{}: skipped {} (not found)", self.label, description);
            }
            Err(e) => {
                warn!("{}: failed to {}: {}", self.label, description, e);
                self.failures += 1;
            }
        }
        self
    }

    /// Delete a file
    pub fn remove_file(&mut self, path: &Path) -> &mut Self {
        self.step(&format!("remove {}", path.display()), || {
            fs::remove_file(path)
        })
    }

    /// Rename a file or directory
    pub fn rename(&mut self, from: &Path, to: &Path) -> &mut Self {
        self.step(
            &format!("rename {} to {}", from.display(), to.display()),
            || fs::rename(from, to),
        )
    }

    /// Delete a directory tree
    pub fn remove_dir_all(&mut self, path: &Path) -> &mut Self {
        self.step(&format!("remove {}", path.display()), || {
            fs::remove_dir_all(path)
        })
    }

    /// Finish the sequence and return the number of failed steps
    pub fn finish(&self) -> usize {
        if self.failures > 0 {
            warn!("{}: {} step(s) failed", self.label, self.failures);
        }
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_are_not_failures() {
        let temp = TempDir::new().unwrap();
        let failures = BestEffort::new("test")
            .remove_file(&temp.path().join("missing"))
            .rename(&temp.path().join("a"), &temp.path().join("b"))
            .remove_dir_all(&temp.path().join("missing-dir"))
            .finish();
        assert_eq!(failures, 0);
    }

    #[test]
    fn test_failure_does_not_stop_later_steps() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("present.txt");
        fs::write(&file, "x").unwrap();

        let mut steps = BestEffort::new("test");
        steps
            .step("fail on purpose", || {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            })
            .remove_file(&file);

        assert_eq!(steps.finish(), 1);
        assert!(!file.exists());
    }

    #[test]
    fn test_rename() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("app");
        let to = temp.path().join("app.bak");
        fs::write(&from, "binary").unwrap();

        let failures = BestEffort::new("test").rename(&from, &to).finish();
        assert_eq!(failures, 0);
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "binary");
    }
}
