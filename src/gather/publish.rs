//! Process spec deduplication and publication of the resolved manifest.

use crate::error::{GatherError, Result};
use crate::manifest::{Containerization, JobInstance, Manifest, ProcessSpec, RenderedInstance};
use crate::ports::sink::OutputSink;
use crate::property::{normalize, PropertyValue};

/// Pairs instances with their rendered process specs, promoting a spec
/// shared by all instances to the job level.
///
/// When every instance rendered an equal spec, each instance's own field is
/// left empty and the shared value is returned alongside. Otherwise every
/// instance keeps its own spec and no job-level value is returned.
#[must_use]
pub fn deduplicate(
    instances: &[JobInstance],
    specs: Vec<ProcessSpec>,
) -> (Vec<RenderedInstance>, Option<ProcessSpec>) {
    let shared = match specs.split_last() {
        Some((last, rest)) if rest.iter().all(|spec| spec == last) => Some(last.clone()),
        _ => None,
    };
    let rendered = instances
        .iter()
        .cloned()
        .zip(specs)
        .map(|(identity, spec)| RenderedInstance {
            identity,
            bpm: if shared.is_some() { None } else { Some(spec) },
        })
        .collect();
    (rendered, shared)
}

/// Converts gathered job data into the property value stored under the
/// reserved key.
///
/// # Errors
///
/// Returns [`GatherError::Output`] if the data cannot be serialized.
pub fn to_property(containerization: &Containerization) -> Result<PropertyValue> {
    serde_yaml::to_value(containerization)
        .map(normalize)
        .map_err(|e| GatherError::Output { message: e.to_string() })
}

/// Serializes the resolved manifest and hands it to the sink.
///
/// # Errors
///
/// Returns [`GatherError::Output`] if serialization or the sink fails.
pub fn publish(sink: &dyn OutputSink, manifest: &Manifest) -> Result<()> {
    let document = manifest.to_yaml().map_err(|e| GatherError::Output { message: e.to_string() })?;
    sink.publish(&document).map_err(|e| GatherError::Output { message: e.to_string() })
}
