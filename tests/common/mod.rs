use std::path::PathBuf;

use tempfile::TempDir;

/// Write `contents` as a report file inside a fresh temp directory.
/// The caller must hold onto `TempDir` to keep the directory alive.
pub fn write_report(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lcov.info");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
