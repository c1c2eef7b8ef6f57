//! Scene directory builders on `tempfile`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory tree of sidecar files, removed on drop.
pub struct SceneDir {
    dir: TempDir,
}

impl SceneDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root path as a string, as passed to a discoverer.
    pub fn root(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    /// Write `contents` at `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write a CSV manifest with one value per row, after an optional header.
    pub fn write_manifest(&self, relative: &str, header: Option<&str>, rows: &[&str]) -> std::io::Result<PathBuf> {
        let mut text = String::new();
        if let Some(header) = header {
            text.push_str(header);
            text.push('\n');
        }
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        self.write(relative, text)
    }
}
