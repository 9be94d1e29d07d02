#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use star_managed::Document;
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Loads a fixture under `tests/data` as a document.
pub fn fixture_document(name: &str) -> Document {
    let text = fs::read_to_string(fixture_path(name)).expect("read fixture");
    Document::parse(&text)
}

/// Builds a one-section document with a single loop block.
pub fn star_table(section: &str, columns: &[&str], rows: &[&str]) -> Document {
    let mut text = format!("{section}\n\nloop_\n");
    for (idx, column) in columns.iter().enumerate() {
        text.push_str(&format!("{column} #{}\n", idx + 1));
    }
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text.push('\n');
    Document::parse(&text)
}

/// Data rows of the first table in `section`, in document order.
pub fn data_rows(document: &Document, section: &str) -> Vec<String> {
    let layout = star_managed::scanner::scan_table(
        document,
        &star_managed::scanner::Dialect::default(),
        section,
    )
    .expect("scan table");
    document.lines()[layout.data].to_vec()
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    /// Copies a fixture into the workspace and returns the new path.
    pub fn copy_fixture(&self, name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::copy(fixture_path(name), &path).expect("copy fixture");
        path
    }
}
