//! Process supervision (bpm) configuration rendered per job instance.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::property::PropertyTree;

/// Parsed `bpm.yml`: the processes one job instance runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Supervised processes.
    #[serde(default)]
    pub processes: Vec<Process>,
}

impl ProcessSpec {
    /// Parses a rendered bpm document.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document does not match the bpm schema.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }
}

/// One supervised process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Process name, unique within the job.
    pub name: String,
    /// Absolute path of the executable.
    pub executable: String,
    /// Command line arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment variables; scalar values are kept in their textual form.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "scalar_map")]
    pub env: BTreeMap<String, String>,
    /// Working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
    /// Lifecycle hooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Hooks>,
    /// Resource limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limits>,
    /// Whether an ephemeral disk is mounted.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ephemeral_disk: bool,
    /// Whether the persistent disk is mounted.
    #[serde(default, skip_serializing_if = "is_false")]
    pub persistent_disk: bool,
    /// Extra volumes mounted into the process.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_volumes: Vec<AdditionalVolume>,
    /// Linux capabilities granted to the process.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
}

/// Lifecycle hooks of a process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hooks {
    /// Executable run before the process starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_start: Option<String>,
}

/// Resource limits of a process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Memory limit, e.g. `1G`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// Maximum open file descriptors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_files: Option<u64>,
    /// Maximum number of processes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processes: Option<u64>,
}

/// A volume mounted in addition to the job's standard directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalVolume {
    /// Mount path.
    pub path: String,
    /// Mounted read-write when set.
    #[serde(default, skip_serializing_if = "is_false")]
    pub writable: bool,
    /// Executables may run from the volume.
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_executions: bool,
    /// Only mounted, never created.
    #[serde(default, skip_serializing_if = "is_false")]
    pub mount_only: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    PropertyTree::deserialize(deserializer)?
        .into_iter()
        .map(|(key, value)| match value.scalar_text() {
            Some(text) => Ok((key, text)),
            None => Err(D::Error::custom(format!(
                "env variable {key} must be a scalar, found {}",
                value.kind()
            ))),
        })
        .collect()
}
