//! Instance identities, resolved links and the reserved gather output.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::process::ProcessSpec;
use crate::property::PropertyTree;

/// Job property key under which gathered data is published.
pub const RESERVED_KEY: &str = "bosh_containerization";

/// Identity of one instance of a job: one (zone, replica) slot in its group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobInstance {
    /// Cluster-local DNS address, `<id>.<namespace>.svc.cluster.local`.
    pub address: String,
    /// Availability zone the instance is placed in.
    pub az: String,
    /// Stable identifier, `<group>-<index>-<job>`.
    pub id: String,
    /// Position across all zones, starting at 0.
    pub index: usize,
    /// Replica number within the zone.
    pub instance: usize,
    /// Display name, `<group>-<job>`.
    pub name: String,
}

/// A provided link as seen by its consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobLink {
    /// Instances of the providing job.
    pub instances: Arc<[JobInstance]>,
    /// Properties the provider exposes, defaults overridden by the manifest.
    pub properties: PropertyTree,
}

/// An instance identity paired with its own process spec.
///
/// `bpm` is empty when the process spec was promoted to the job level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedInstance {
    /// Instance identity.
    #[serde(flatten)]
    pub identity: JobInstance,
    /// Process spec rendered for this instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<ProcessSpec>,
}

impl From<JobInstance> for RenderedInstance {
    fn from(identity: JobInstance) -> Self {
        Self { identity, bpm: None }
    }
}

/// Everything gathered for one job, stored under [`RESERVED_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Containerization {
    /// Instances of the job, in addressing order.
    pub instances: Vec<RenderedInstance>,
    /// Resolved links keyed by declared consumer name.
    pub consumes: BTreeMap<String, JobLink>,
    /// Release name, set only when the release is declared in the manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Process spec shared by every instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<ProcessSpec>,
}
