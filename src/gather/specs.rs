//! Release job spec loading.
//!
//! Job specs live in a fixed layout under the base directory:
//!
//! ```text
//! <base>/jobs-src/<release>/<job>/
//!   ├── job.MF
//!   └── templates/bpm.yml.erb
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GatherError, Result};
use crate::manifest::JobSpec;
use crate::ports::filesystem::FileSystem;

/// Resolves release job files relative to the base directory.
#[derive(Debug, Clone)]
pub struct ReleaseLayout {
    base_dir: PathBuf,
}

impl ReleaseLayout {
    /// Creates a layout rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: &Path) -> Self {
        Self { base_dir: base_dir.to_path_buf() }
    }

    /// Directory holding one release job.
    #[must_use]
    pub fn job_dir(&self, release: &str, job: &str) -> PathBuf {
        self.base_dir.join("jobs-src").join(release).join(job)
    }

    /// Location of the job's `job.MF`.
    #[must_use]
    pub fn spec_path(&self, release: &str, job: &str) -> PathBuf {
        self.job_dir(release, job).join("job.MF")
    }

    /// Location of the job's bpm template.
    #[must_use]
    pub fn template_path(&self, release: &str, job: &str) -> PathBuf {
        self.job_dir(release, job).join("templates").join("bpm.yml.erb")
    }
}

/// Loads job specs on first use and keeps them for the rest of the run.
pub struct SpecCache<'a> {
    fs: &'a dyn FileSystem,
    layout: &'a ReleaseLayout,
    specs: BTreeMap<(String, String), JobSpec>,
}

impl<'a> SpecCache<'a> {
    /// Creates an empty cache reading through `fs`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, layout: &'a ReleaseLayout) -> Self {
        Self { fs, layout, specs: BTreeMap::new() }
    }

    /// Returns the spec of `job` in `release`, reading it if not cached yet.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::Io`] if `job.MF` cannot be read and
    /// [`GatherError::Parse`] if it is not a valid job spec.
    pub fn load(&mut self, release: &str, job: &str) -> Result<&JobSpec> {
        match self.specs.entry((release.to_string(), job.to_string())) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.layout.spec_path(release, job);
                let contents = self
                    .fs
                    .read_to_string(&path)
                    .map_err(|e| GatherError::Io { path: path.clone(), message: e.to_string() })?;
                let spec = JobSpec::from_yaml(&contents).map_err(|e| GatherError::Parse {
                    what: format!("job spec {}", path.display()),
                    message: e.to_string(),
                })?;
                debug!(release, job, path = %path.display(), "loaded job spec");
                Ok(entry.insert(spec))
            }
        }
    }

    /// Number of distinct specs loaded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if nothing has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
