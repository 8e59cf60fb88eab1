//! Per-instance rendering of process spec templates.

use tracing::debug;

use crate::error::{GatherError, Result};
use crate::manifest::{Job, JobInstance, JobSpec, ProcessSpec, RESERVED_KEY};
use crate::ports::filesystem::FileSystem;
use crate::ports::renderer::{InstanceInfo, RenderRequest, TemplateRenderer};
use crate::property::{PropertyTree, PropertyValue};

use super::specs::ReleaseLayout;

/// Renders the bpm template of a job once for each of its instances.
pub struct RenderAdapter<'a> {
    fs: &'a dyn FileSystem,
    renderer: &'a dyn TemplateRenderer,
    layout: &'a ReleaseLayout,
    deployment: &'a str,
}

impl<'a> RenderAdapter<'a> {
    /// Creates an adapter for the deployment named `deployment`.
    #[must_use]
    pub fn new(
        fs: &'a dyn FileSystem,
        renderer: &'a dyn TemplateRenderer,
        layout: &'a ReleaseLayout,
        deployment: &'a str,
    ) -> Self {
        Self { fs, renderer, layout, deployment }
    }

    /// Renders and parses one process spec per instance, in instance order.
    ///
    /// `gathered` is the job's data collected so far (instances, resolved
    /// links, release). Templates read it under the reserved key, e.g.
    /// `p("bosh_containerization.consumes.db.instances")`.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::TemplateNotFound`] when the job ships no bpm
    /// template, [`GatherError::Io`] when it cannot be read, and
    /// [`GatherError::Render`] when rendering or parsing fails for any
    /// instance.
    pub fn render_job(
        &self,
        job: &Job,
        spec: &JobSpec,
        instances: &[JobInstance],
        gathered: &PropertyValue,
    ) -> Result<Vec<ProcessSpec>> {
        let template_path = self.layout.template_path(&job.release, &job.name);
        if !self.fs.exists(&template_path) {
            return Err(GatherError::TemplateNotFound { path: template_path });
        }
        let template = self.fs.read_to_string(&template_path).map_err(|e| GatherError::Io {
            path: template_path.clone(),
            message: e.to_string(),
        })?;
        let spec_path = self.layout.spec_path(&job.release, &job.name);
        let properties = effective_properties(job, spec, gathered);

        instances
            .iter()
            .map(|instance| {
                let info = InstanceInfo::new(instance, self.deployment);
                let request = RenderRequest {
                    template_path: &template_path,
                    template: &template,
                    spec_path: &spec_path,
                    properties: &properties,
                    instance: &info,
                };
                let rendered = self.renderer.render(&request).map_err(|e| GatherError::Render {
                    instance: instance.id.clone(),
                    message: e.to_string(),
                })?;
                debug!(instance = %instance.id, "rendered process spec");
                ProcessSpec::from_yaml(&rendered).map_err(|e| GatherError::Render {
                    instance: instance.id.clone(),
                    message: format!("invalid bpm document: {e}"),
                })
            })
            .collect()
    }
}

/// Spec defaults for every declared property, overlaid with the job's
/// manifest properties. The reserved key holds `gathered`, replacing
/// whatever the manifest put there.
#[must_use]
pub fn effective_properties(
    job: &Job,
    spec: &JobSpec,
    gathered: &PropertyValue,
) -> PropertyTree {
    let mut properties = spec.defaults();
    properties.merge(&job.properties);
    properties.insert(RESERVED_KEY, gathered.clone());
    properties
}
