//! Live output sinks: a file on disk or standard output.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::ports::sink::OutputSink;

/// Writes the resolved manifest to a file, creating parent directories.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Creates a sink targeting `path`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }
}

impl OutputSink for FileSink {
    fn publish(&self, document: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(&self.path, document)?)
    }
}

/// Writes the resolved manifest to standard output.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn publish(&self, document: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
