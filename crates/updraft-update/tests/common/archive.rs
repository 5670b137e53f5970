//! Zip fixtures for install tests

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::constants::*;

/// Payload of the last entry in [`update_archive`]; corrupted by [`corrupt_archive`]
pub const LAST_ENTRY_PAYLOAD: &[u8] = b"LAST-ENTRY-PAYLOAD-0123456789";

/// Build an update archive with a single top-level directory
///
/// Entries are stored uncompressed so their bytes can be located and
/// tampered with.
pub fn update_archive() -> Vec<u8> {
    archive_rooted_at(ARCHIVE_ROOT)
}

/// Same layout as [`update_archive`] under a different top-level directory
pub fn archive_rooted_at(root: &str) -> Vec<u8> {
    build_zip(&[
        (format!("{}/", root), None),
        (format!("{}/{}", root, EXECUTABLE), Some(NEW_EXECUTABLE)),
        (
            format!("{}/{}", root, VERSION_MARKER),
            Some(NEW_VERSION_MARKER.as_bytes()),
        ),
        (format!("{}/resource/", root), None),
        (format!("{}/resource/data.bin", root), Some(LAST_ENTRY_PAYLOAD)),
    ])
}

/// Flip a byte inside the last entry so its CRC check fails mid-extraction
pub fn corrupt_archive(mut archive: Vec<u8>) -> Vec<u8> {
    let offset = archive
        .windows(LAST_ENTRY_PAYLOAD.len())
        .position(|w| w == LAST_ENTRY_PAYLOAD)
        .expect("payload present in stored archive");
    archive[offset] ^= 0xff;
    archive
}

/// Archive with two top-level directories
pub fn multi_root_archive() -> Vec<u8> {
    build_zip(&[
        (format!("{}/{}", ARCHIVE_ROOT, EXECUTABLE), Some(NEW_EXECUTABLE)),
        ("Other/readme.txt".to_string(), Some(b"other".as_slice())),
    ])
}

fn build_zip(entries: &[(String, Option<&[u8]>)]) -> Vec<u8> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, data) in entries {
        match data {
            None => writer.add_directory(name.as_str(), options).unwrap(),
            Some(data) => {
                writer.start_file(name.as_str(), options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
    }

    writer.finish().unwrap().into_inner()
}
