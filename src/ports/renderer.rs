//! Template renderer port for process spec templates.

use std::path::Path;

use crate::manifest::JobInstance;
use crate::property::PropertyTree;

/// Instance facts exposed to templates as `spec.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    /// Cluster-local address.
    pub address: String,
    /// Availability zone.
    pub az: String,
    /// Instance id.
    pub id: String,
    /// Index across zones, as decimal text.
    pub index: String,
    /// Deployment (manifest) name.
    pub deployment: String,
    /// Instance display name.
    pub name: String,
    /// Set on the first instance of the job.
    pub bootstrap: bool,
}

impl InstanceInfo {
    /// Builds the template view of an instance identity.
    #[must_use]
    pub fn new(instance: &JobInstance, deployment: &str) -> Self {
        Self {
            address: instance.address.clone(),
            az: instance.az.clone(),
            id: instance.id.clone(),
            index: instance.index.to_string(),
            deployment: deployment.to_string(),
            name: instance.name.clone(),
            bootstrap: instance.index == 0,
        }
    }
}

/// Everything a renderer needs to produce one instance's process spec.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Where the template was read from.
    pub template_path: &'a Path,
    /// Template source text.
    pub template: &'a str,
    /// The job spec the template belongs to.
    pub spec_path: &'a Path,
    /// Effective job properties: spec defaults overlaid with manifest settings.
    pub properties: &'a PropertyTree,
    /// The instance being rendered.
    pub instance: &'a InstanceInfo,
}

/// Renders a process spec template for a single instance.
///
/// Implementations must be pure: the same request always yields the same
/// output.
pub trait TemplateRenderer: Send + Sync {
    /// Renders the template to text.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed templates or properties the template
    /// requires but the request does not carry.
    fn render(
        &self,
        request: &RenderRequest<'_>,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}
