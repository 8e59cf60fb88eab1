//! Deployment manifest document.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::property::{scalar_text, PropertyTree};

/// A deployment manifest: releases, instance groups and variables.
///
/// Keys this crate does not interpret (stemcells, update blocks, networks,
/// ...) are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Deployment name.
    pub name: String,
    /// Releases the deployment draws jobs from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub releases: Vec<Release>,
    /// Instance groups, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instance_groups: Vec<InstanceGroup>,
    /// Declared variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    /// Uninterpreted top-level keys.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Manifest {
    /// Parses a manifest from YAML.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document is malformed or misses
    /// required fields.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Serializes the manifest to YAML.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Returns `true` if a release with this name is declared.
    #[must_use]
    pub fn has_release(&self, name: &str) -> bool {
        self.releases.iter().any(|r| r.name == name)
    }
}

/// A named, versioned bundle of jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Release name.
    pub name: String,
    /// Release version.
    #[serde(default, deserialize_with = "scalar_text")]
    pub version: String,
    /// Uninterpreted keys (url, sha1, stemcell, ...).
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A set of replicated job instances spread across availability zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceGroup {
    /// Group name.
    pub name: String,
    /// Replica count per availability zone.
    pub instances: usize,
    /// Availability zones, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub azs: Vec<String>,
    /// Jobs colocated on every instance of the group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<Job>,
    /// Uninterpreted keys.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A job placed in an instance group, with its manifest-level overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Job name inside its release.
    pub name: String,
    /// Name of the release providing the job.
    pub release: String,
    /// Explicit property settings; these win over spec defaults.
    #[serde(default, skip_serializing_if = "PropertyTree::is_empty")]
    pub properties: PropertyTree,
    /// Consumer overrides, keyed by consumer name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<PropertyTree>,
    /// Provider overrides, keyed by provider name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provides: Option<PropertyTree>,
    /// Uninterpreted keys.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A variable declared in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Variable type (password, certificate, ...).
    #[serde(rename = "type")]
    pub variable_type: String,
    /// Generation options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PropertyTree>,
    /// Uninterpreted keys (`update_mode`, `consumes`, ...).
    #[serde(flatten)]
    pub extra: Mapping,
}
