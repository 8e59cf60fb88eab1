//! Deployment manifest and release job spec types.
//!
//! Defines the Rust types that mirror the manifest and `job.MF` YAML
//! schemas, plus the per-instance identity and link types the gatherer
//! produces from them.

mod document;
mod instance;
mod job_spec;
mod process;

pub use document::{InstanceGroup, Job, Manifest, Release, Variable};
pub use instance::{Containerization, JobInstance, JobLink, RenderedInstance, RESERVED_KEY};
pub use job_spec::{JobSpec, LinkConsumer, LinkProvider, PropertyDefinition};
pub use process::{AdditionalVolume, Hooks, Limits, Process, ProcessSpec};
