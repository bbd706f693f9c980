#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// Path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Read a fixture as text.
pub fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture(name))
        .unwrap_or_else(|e| panic!("fixture {} unreadable: {}", name, e))
}

/// Copy a fixture into `dir` so the test can modify it.
pub fn copy_fixture(name: &str, dir: &Path) -> PathBuf {
    let target = dir.join(name);
    std::fs::copy(fixture(name), &target).unwrap();
    target
}

/// The binary, isolated from any settings file in the real home dir.
pub fn symbol_iface(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("symbol-iface").unwrap();
    cmd.env("HOME", home).env("TMPDIR", home);
    cmd
}

/// Entries of `dir`, sorted by name.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
