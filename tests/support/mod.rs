use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary vault of Markdown documents for integration tests.
pub struct TestVault {
    dir: TempDir,
}

impl TestVault {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_document(&self, rel_path: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write document");
        path
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        self.write_document(".tick.toml", contents)
    }

    pub fn read_document(&self, rel_path: &str) -> String {
        fs::read_to_string(self.dir.path().join(rel_path)).expect("read document")
    }
}
