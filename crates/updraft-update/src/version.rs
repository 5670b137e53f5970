//! Version parsing and comparison
//!
//! Release tags and the locally recorded version are free-form strings that
//! end in `vMAJOR.MINOR.PATCH` (e.g. `MyApp v1.4.2`). Anything before the
//! suffix is ignored.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::{Result, UpdateError};

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v(\d+)\.(\d+)\.(\d+)$").expect("version regex is valid"));

/// Semantic version triple; ordering is lexicographic over (major, minor, patch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReleaseVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ReleaseVersion {
    /// Create a version from its components
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the trailing `vMAJOR.MINOR.PATCH` from a string
    ///
    /// When several matches exist the last one is authoritative.
    pub fn parse(input: &str) -> Result<Self> {
        let caps = VERSION_RE
            .captures_iter(input)
            .last()
            .ok_or_else(|| UpdateError::invalid_version(input))?;

        let component = |i: usize| -> Result<u64> {
            caps[i]
                .parse()
                .map_err(|_| UpdateError::invalid_version(input))
        };

        Ok(Self::new(component(1)?, component(2)?, component(3)?))
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Whether `candidate` is strictly newer than `current`
///
/// Fails when either string carries no version suffix.
pub fn is_newer(current: &str, candidate: &str) -> Result<bool> {
    Ok(ReleaseVersion::parse(candidate)? > ReleaseVersion::parse(current)?)
}
