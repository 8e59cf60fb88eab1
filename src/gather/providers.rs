//! Link provider table.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{GatherError, Result};
use crate::manifest::{Job, JobInstance, JobLink, JobSpec, LinkProvider};
use crate::property::PropertyTree;

/// Every link provided in the deployment, keyed by (type, name).
#[derive(Debug, Default)]
pub struct ProviderTable {
    links: BTreeMap<(String, String), JobLink>,
}

impl ProviderTable {
    /// Registers every link `job` provides according to its spec.
    ///
    /// Each link exposes the properties its declaration lists, taking the
    /// manifest value at that exact dotted path when set and the spec
    /// default otherwise. Only the listed leaf is copied: a manifest subtree
    /// under the path's first segment is not pulled in wholesale, and
    /// several listed paths sharing a prefix merge into one nested tree.
    /// The link is published under the declared name unless the job's
    /// `provides` override renames it with `as`.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::TypeMismatch`] for a malformed `provides`
    /// override and [`GatherError::DuplicateProvider`] when the (type, name)
    /// pair is already taken.
    pub fn collect(
        &mut self,
        job: &Job,
        spec: &JobSpec,
        instances: &Arc<[JobInstance]>,
    ) -> Result<()> {
        for provider in &spec.provides {
            let name = provided_name(job, provider)?;
            let link = JobLink {
                instances: Arc::clone(instances),
                properties: link_properties(job, spec, provider),
            };
            self.register(&provider.link_type, &name, link)?;
            debug!(
                job = %job.name,
                link_type = %provider.link_type,
                %name,
                "registered link provider"
            );
        }
        Ok(())
    }

    /// Inserts a link under (type, name).
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::DuplicateProvider`] if the key is taken; the
    /// existing entry is left untouched.
    pub fn register(&mut self, link_type: &str, name: &str, link: JobLink) -> Result<()> {
        match self.links.entry((link_type.to_string(), name.to_string())) {
            Entry::Occupied(_) => Err(GatherError::DuplicateProvider {
                name: name.to_string(),
                link_type: link_type.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(link);
                Ok(())
            }
        }
    }

    /// Looks up the link provided under (type, name).
    #[must_use]
    pub fn get(&self, link_type: &str, name: &str) -> Option<&JobLink> {
        self.links.get(&(link_type.to_string(), name.to_string()))
    }

    /// Number of registered links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if no link is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn link_properties(job: &Job, spec: &JobSpec, provider: &LinkProvider) -> PropertyTree {
    let mut properties = PropertyTree::new();
    for path in &provider.properties {
        let value = job.properties.lookup(path).unwrap_or_else(|| spec.default_for(path));
        properties.insert_path(path, value.clone());
    }
    properties
}

fn provided_name(job: &Job, provider: &LinkProvider) -> Result<String> {
    let Some(value) = job.provides.as_ref().and_then(|overrides| overrides.get(&provider.name))
    else {
        return Ok(provider.name.clone());
    };
    let context = format!("provides.{} of job {}", provider.name, job.name);
    let overrides = value.as_tree().ok_or_else(|| GatherError::TypeMismatch {
        context: context.clone(),
        found: value.kind(),
        expected: "mapping",
    })?;
    let Some(alias) = overrides.get("as") else {
        return Ok(provider.name.clone());
    };
    alias.scalar_text().filter(|_| !alias.is_null()).ok_or_else(|| GatherError::TypeMismatch {
        context: format!("{context}.as"),
        found: alias.kind(),
        expected: "scalar",
    })
}
