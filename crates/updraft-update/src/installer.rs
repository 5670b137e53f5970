//! Applying a downloaded update
//!
//! Two strategies exist and one is chosen per platform:
//!
//! - **Package hand-off** (macOS): the artifact is a native installer
//!   package. Nothing on disk is touched; the user finishes the install
//!   from the release page.
//! - **In-place archive** (Windows, Linux): the artifact is a zip with a
//!   single top-level directory whose contents replace the application
//!   root. The archive is unpacked into a scratch directory under the root
//!   and copied over from there. The executable and version marker are
//!   stashed as backups first and restored if extraction fails.
//!
//! Every backup and rollback step is independent and best-effort. Only the
//! extraction itself decides whether the install succeeded.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, warn};
use updraft_core::types::{InstallPaths, InstallStrategy, PlatformTarget};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::cleanup::BestEffort;
use crate::error::{IoResultExt, Result, UpdateError};

/// Result of an install attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The package was left for the user to install
    HandedOff,

    /// New files are in place; a restart is required
    Applied,

    /// The install failed; the previous files were restored where possible
    RolledBack { error: String },
}

impl InstallOutcome {
    /// Whether the new version is (or will be) installed
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::RolledBack { .. })
    }
}

/// Installer strategy selected for the running platform
#[derive(Debug, Clone)]
pub enum Installer {
    PackageHandoff(PackageHandoffInstaller),
    InPlaceArchive(InPlaceArchiveInstaller),
}

impl Installer {
    /// Select the installer for `platform`
    pub fn for_platform(
        platform: &PlatformTarget,
        paths: &InstallPaths,
        backup_suffix: &str,
    ) -> Self {
        match platform.install_strategy() {
            InstallStrategy::PackageHandoff => Self::PackageHandoff(PackageHandoffInstaller),
            InstallStrategy::InPlaceArchive => {
                Self::InPlaceArchive(InPlaceArchiveInstaller::new(paths, backup_suffix))
            }
        }
    }

    /// Strategy implemented by this installer
    pub fn strategy(&self) -> InstallStrategy {
        match self {
            Self::PackageHandoff(_) => InstallStrategy::PackageHandoff,
            Self::InPlaceArchive(_) => InstallStrategy::InPlaceArchive,
        }
    }

    /// Install the staged artifact
    ///
    /// Blocking filesystem work runs on the blocking thread pool.
    pub async fn install(&self, staged: &Path) -> Result<InstallOutcome> {
        match self {
            Self::PackageHandoff(installer) => Ok(installer.install(staged)),
            Self::InPlaceArchive(installer) => {
                let installer = installer.clone();
                let staged = staged.to_path_buf();
                let outcome =
                    tokio::task::spawn_blocking(move || installer.install(&staged)).await?;
                Ok(outcome)
            }
        }
    }
}

/// Leaves the staged package for the user's native installer
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageHandoffInstaller;

impl PackageHandoffInstaller {
    /// Hand the package off without touching the filesystem
    pub fn install(&self, staged: &Path) -> InstallOutcome {
        info!("Package ready for manual install: {}", staged.display());
        InstallOutcome::HandedOff
    }
}

/// Files stashed before an in-place install, paired with their backups
#[derive(Debug, Clone)]
pub struct BackupSet {
    entries: Vec<(PathBuf, PathBuf)>,
}

impl BackupSet {
    /// Pair each file with a sibling named `<file>.<suffix>`
    pub fn new<'a>(files: impl IntoIterator<Item = &'a Path>, suffix: &str) -> Self {
        let entries = files
            .into_iter()
            .map(|file| (file.to_path_buf(), backup_path(file, suffix)))
            .collect();
        Self { entries }
    }

    /// Delete backups left over from an earlier install
    pub fn clear_stale(&self) -> usize {
        let mut steps = BestEffort::new("clear stale backups");
        for (_, backup) in &self.entries {
            steps.remove_file(backup);
        }
        steps.finish()
    }

    /// Move the current files to their backups
    pub fn stash(&self) -> usize {
        let mut steps = BestEffort::new("stash current files");
        for (original, backup) in &self.entries {
            steps.rename(original, backup);
        }
        steps.finish()
    }

    /// Put the backups back in place of whatever is there now
    pub fn restore(&self) -> usize {
        let mut steps = BestEffort::new("restore backups");
        for (original, _) in &self.entries {
            steps.remove_file(original);
        }
        for (original, backup) in &self.entries {
            steps.rename(backup, original);
        }
        steps.finish()
    }
}

fn backup_path(file: &Path, suffix: &str) -> PathBuf {
    let mut name = file.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    file.with_file_name(name)
}

/// Replaces the application root with the contents of a zip archive
#[derive(Debug, Clone)]
pub struct InPlaceArchiveInstaller {
    app_root: PathBuf,
    backups: BackupSet,
}

impl InPlaceArchiveInstaller {
    /// Create an installer for the given layout
    pub fn new(paths: &InstallPaths, backup_suffix: &str) -> Self {
        Self {
            app_root: paths.app_root.clone(),
            backups: BackupSet::new(
                [paths.executable.as_path(), paths.version_marker.as_path()],
                backup_suffix,
            ),
        }
    }

    /// Apply the staged archive
    ///
    /// Never fails: extraction errors trigger a rollback and are reported in
    /// the outcome. The staged archive is deleted in every case.
    pub fn install(&self, staged: &Path) -> InstallOutcome {
        info!("Applying update from {}", staged.display());

        self.backups.clear_stale();
        self.backups.stash();

        let outcome = match self.apply(staged) {
            Ok(()) => {
                info!("Update applied to {}", self.app_root.display());
                InstallOutcome::Applied
            }
            Err(e) => {
                error!("Update failed, rolling back: {}", e);
                self.rollback();
                InstallOutcome::RolledBack {
                    error: e.to_string(),
                }
            }
        };

        BestEffort::new("remove staged archive")
            .remove_file(staged)
            .finish();

        outcome
    }

    /// Extract the archive and copy its top-level directory over the root
    ///
    /// Entries are unpacked into a fresh scratch directory under the root,
    /// never into the root itself. The scratch directory is removed on every
    /// path out of this function.
    fn apply(&self, staged: &Path) -> Result<()> {
        let file = File::open(staged).fs_context("Failed to open update archive", staged)?;
        let mut archive = ZipArchive::new(file)?;

        let top = top_level_dir(&mut archive)?;

        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&self.app_root)
            .fs_context("Failed to create extraction directory", &self.app_root)?;

        debug!(
            "Extracting {} entries into {}",
            archive.len(),
            scratch.path().display()
        );
        extract_all(&mut archive, scratch.path())?;

        copy_tree(&scratch.path().join(&top), &self.app_root)?;

        let scratch_path = scratch.path().to_path_buf();
        BestEffort::new("remove extracted directory")
            .step(&format!("remove {}", scratch_path.display()), || {
                scratch.close()
            })
            .finish();
        Ok(())
    }

    fn rollback(&self) {
        let failures = self.backups.restore();
        if failures > 0 {
            warn!("Rollback finished with {} failed step(s)", failures);
        } else {
            info!("Rollback complete");
        }
    }
}

/// Name prefix of the scratch directory archives are unpacked into
pub const SCRATCH_PREFIX: &str = ".update-extract-";

fn unsafe_entry(name: &str) -> UpdateError {
    UpdateError::InvalidArchive(format!("unsafe entry path {:?}", name))
}

/// Name of the single directory every archive entry lives under
fn top_level_dir<R: io::Read + io::Seek>(archive: &mut ZipArchive<R>) -> Result<PathBuf> {
    let mut top: Option<PathBuf> = None;

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let name = entry
            .enclosed_name()
            .ok_or_else(|| unsafe_entry(entry.name()))?;

        let mut components = name.components();
        let first = match components.next() {
            Some(Component::Normal(first)) => PathBuf::from(first),
            _ => continue,
        };
        if components.next().is_none() && !entry.is_dir() {
            return Err(UpdateError::InvalidArchive(format!(
                "file {:?} is outside the top-level directory",
                entry.name()
            )));
        }

        match &top {
            None => top = Some(first),
            Some(existing) if *existing == first => {}
            Some(existing) => {
                return Err(UpdateError::InvalidArchive(format!(
                    "expected a single top-level directory, found {:?} and {:?}",
                    existing, first
                )))
            }
        }
    }

    top.ok_or_else(|| UpdateError::InvalidArchive("archive is empty".to_string()))
}

fn extract_all<R: io::Read + io::Seek>(archive: &mut ZipArchive<R>, dest: &Path) -> Result<()> {
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry
            .enclosed_name()
            .ok_or_else(|| unsafe_entry(entry.name()))?;
        let out_path = dest.join(name);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).fs_context("Failed to create directory", &out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).fs_context("Failed to create directory", parent)?;
        }

        let mut out = File::create(&out_path).fs_context("Failed to create file", &out_path)?;
        io::copy(&mut entry, &mut out).fs_context("Failed to extract file", &out_path)?;
        apply_mode(&out_path, entry.unix_mode())?;
    }
    Ok(())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match mode {
        Some(mode) => fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
            .fs_context("Failed to set permissions", path),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

/// Recursively copy the contents of `src` into `dest`, overwriting files
fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("filesystem loop"));
            UpdateError::filesystem("Failed to walk extracted files", &path, source)
        })?;

        let relative = entry.path().strip_prefix(src).map_err(|_| {
            UpdateError::InvalidArchive("extracted path escaped its directory".to_string())
        })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).fs_context("Failed to create directory", &target)?;
        } else {
            fs::copy(entry.path(), &target).fs_context("Failed to copy file", &target)?;
        }
    }
    Ok(())
}
