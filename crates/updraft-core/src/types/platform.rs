//! Platform detection for asset selection and installer strategy
//!
//! The running platform is detected once at startup and never changes.
//! It decides two things: which release asset matches this machine, and
//! whether the update is applied in place or handed off to the native
//! package installer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// macOS (package installer hand-off)
    #[serde(rename = "macos")]
    MacOs,

    /// Windows (in-place archive replacement)
    Windows,

    /// Linux and other Unix-likes (in-place archive replacement)
    Linux,
}

impl OsFamily {
    /// Detect the OS family of the running process
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            _ => Self::Linux,
        }
    }

    /// Label used in release asset names (e.g. `_macOS_arm64.dmg`)
    pub fn asset_label(&self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Windows => "windows",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_label())
    }
}

/// How a downloaded update gets applied on a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStrategy {
    /// The artifact is a native package; the user finishes the install
    PackageHandoff,

    /// The artifact is an archive extracted over the application root
    InPlaceArchive,
}

/// Immutable (OS family, CPU architecture) pair of the running process
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformTarget {
    os: OsFamily,
    arch: String,
}

impl PlatformTarget {
    /// Create a platform target explicitly
    pub fn new(os: OsFamily, arch: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
        }
    }

    /// Detect the platform of the running process
    ///
    /// macOS release assets use Apple's `arm64` naming, so `aarch64` is
    /// reported as `arm64` there.
    pub fn detect() -> Self {
        let os = OsFamily::current();
        let arch = match (os, std::env::consts::ARCH) {
            (OsFamily::MacOs, "aarch64") => "arm64",
            (_, arch) => arch,
        };
        Self::new(os, arch)
    }

    /// OS family
    pub fn os(&self) -> OsFamily {
        self.os
    }

    /// CPU architecture label
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Installer strategy for this platform
    pub fn install_strategy(&self) -> InstallStrategy {
        match self.os {
            OsFamily::MacOs => InstallStrategy::PackageHandoff,
            OsFamily::Windows | OsFamily::Linux => InstallStrategy::InPlaceArchive,
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
