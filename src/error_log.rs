use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Append-only diagnostic file for failures that happen before the store is
/// usable.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `<dd.mm.YYYY HH:MM:SS> <message>` as one line. Write failures
    /// are only traced.
    pub fn append(&self, message: &str) {
        let line = format!("{} {}\n", Local::now().format("%d.%m.%Y %H:%M:%S"), message);
        if let Err(e) = self.write_line(&line) {
            tracing::warn!("Failed to write error log {:?}: {}", self.path, e);
        }
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}
