//! Integration tests for batch and pair-list replacement against real files

mod batch;
mod pairs;

use std::fs;
use std::path::{Path, PathBuf};

/// Helper to write a fixture file and return its path
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
