//! In-memory port implementations shared by unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::renderer::ErbRenderer;
use crate::context::ServiceContext;
use crate::ports::filesystem::FileSystem;
use crate::ports::sink::OutputSink;

/// In-memory filesystem that counts reads per path.
///
/// Clones share the same files, so a test can keep a handle after moving
/// one into a [`ServiceContext`].
#[derive(Clone, Default)]
pub struct MemFs {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    reads: Arc<Mutex<HashMap<PathBuf, usize>>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, path: impl AsRef<Path>, contents: &str) {
        self.files.lock().unwrap().insert(path.as_ref().to_path_buf(), contents.to_string());
    }

    pub fn reads_of(&self, path: impl AsRef<Path>) -> usize {
        self.reads.lock().unwrap().get(path.as_ref()).copied().unwrap_or(0)
    }
}

impl FileSystem for MemFs {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        *self.reads.lock().unwrap().entry(path.to_path_buf()).or_insert(0) += 1;
        let files = self.files.lock().unwrap();
        files.get(path).cloned().ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

/// Sink that keeps every published document.
#[derive(Clone, Default)]
pub struct MemSink {
    documents: Arc<Mutex<Vec<String>>>,
}

impl MemSink {
    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }
}

impl OutputSink for MemSink {
    fn publish(&self, document: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.documents.lock().unwrap().push(document.to_string());
        Ok(())
    }
}

/// Context over `fs` with the built-in renderer and a capturing sink.
pub fn context(fs: &MemFs) -> (ServiceContext, MemSink) {
    let sink = MemSink::default();
    let ctx = ServiceContext {
        fs: Box::new(fs.clone()),
        renderer: Box::new(ErbRenderer),
        sink: Box::new(sink.clone()),
    };
    (ctx, sink)
}

/// Writes a job spec and bpm template under `<base>/jobs-src/<release>/<job>/`.
pub fn add_job(fs: &MemFs, base: &str, release: &str, job: &str, spec: &str, template: &str) {
    let dir = Path::new(base).join("jobs-src").join(release).join(job);
    fs.add(dir.join("job.MF"), spec);
    fs.add(dir.join("templates").join("bpm.yml.erb"), template);
}
