//! Shared constants for test infrastructure

// Versions
pub const CURRENT_VERSION: &str = "v1.0.0";
pub const NEWER_TAG: &str = "v9.9.9";
pub const OLDER_TAG: &str = "v0.9.0";

// Feed coordinates
pub const REPO_OWNER: &str = "acme";
pub const REPO_NAME: &str = "gadget";
pub const LATEST_RELEASE_PATH: &str = "/repos/acme/gadget/releases/latest";
pub const RELEASE_PAGE: &str = "https://example.com/acme/gadget/releases/latest";

// Asset names
pub const WINDOWS_ZIP: &str = "Gadget_windows_x86_64.zip";
pub const MACOS_ARM64_DMG: &str = "Gadget_macOS_arm64.dmg";
pub const MACOS_X86_64_DMG: &str = "Gadget_macOS_x86_64.dmg";
pub const CHECKSUMS: &str = "Gadget_checksums.txt";

// Installed application layout
pub const EXECUTABLE: &str = "app.exe";
pub const VERSION_MARKER: &str = "version.txt";
pub const ARCHIVE_ROOT: &str = "Gadget";

// File contents
pub const OLD_EXECUTABLE: &[u8] = b"\x7fOLD-EXECUTABLE\x00\x01\x02";
pub const NEW_EXECUTABLE: &[u8] = b"\x7fNEW-EXECUTABLE\x00\x03\x04";
pub const NEW_VERSION_MARKER: &str = "Gadget v9.9.9";
