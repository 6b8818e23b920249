//! Shared test utilities
//!
//! Each integration test binary pulls in the subset it needs.
#![allow(dead_code)]

pub mod audio_generator;

use std::path::PathBuf;

/// Directory for optional binary fixtures (Ogg Vorbis assets).
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

/// First `.ogg` fixture found, if any.
///
/// Vorbis assets cannot be generated deterministically in-tree the way WAV
/// assets can, so Vorbis integration tests run only when a fixture is
/// present and skip with a notice otherwise.
pub fn first_vorbis_fixture() -> Option<(PathBuf, Vec<u8>)> {
    let dir = fixture_dir();
    let entries = std::fs::read_dir(&dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("ogg") {
            if let Ok(bytes) = std::fs::read(&path) {
                return Some((path, bytes));
            }
        }
    }
    None
}
