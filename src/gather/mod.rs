//! Manifest data gathering.
//!
//! Turns a deployment manifest plus release job specs into a resolved
//! manifest in two passes:
//!
//! 1. For every selected instance group and job: load the job spec, address
//!    the job's instances and register the links it provides.
//! 2. For every selected job: bind its consumed links, render its process
//!    spec per instance, deduplicate the result and store everything under
//!    the job's reserved property key.
//!
//! The run is all-or-nothing: the first error aborts it and nothing is
//! published.

pub mod addressing;
pub mod consumers;
pub mod providers;
pub mod publish;
pub mod render;
pub mod specs;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::context::ServiceContext;
use crate::error::Result;
use crate::manifest::{Containerization, JobInstance, Manifest, RenderedInstance, RESERVED_KEY};

use addressing::Placement;
use providers::ProviderTable;
use render::RenderAdapter;
use specs::{ReleaseLayout, SpecCache};

/// Inputs of a gather run besides the manifest itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherOptions {
    /// Directory containing `jobs-src/<release>/<job>/`.
    pub base_dir: PathBuf,
    /// Namespace used in instance addresses.
    pub namespace: String,
    /// Instance groups to process; empty selects all of them.
    pub instance_groups: Vec<String>,
}

impl GatherOptions {
    fn selects(&self, group: &str) -> bool {
        self.instance_groups.is_empty() || self.instance_groups.iter().any(|name| name == group)
    }
}

/// Resolves `manifest` and returns the resolved copy.
///
/// Unselected instance groups are copied through unchanged.
///
/// # Errors
///
/// Returns the first [`GatherError`](crate::error::GatherError) hit while
/// loading specs, resolving links or rendering templates.
pub fn gather(
    ctx: &ServiceContext,
    manifest: &Manifest,
    options: &GatherOptions,
) -> Result<Manifest> {
    let layout = ReleaseLayout::new(&options.base_dir);
    let mut specs = SpecCache::new(ctx.fs.as_ref(), &layout);
    let mut providers = ProviderTable::default();

    let mut addressed: Vec<(usize, Vec<Arc<[JobInstance]>>)> = Vec::new();
    for (group_index, group) in manifest.instance_groups.iter().enumerate() {
        if !options.selects(&group.name) {
            continue;
        }
        let placement = Placement {
            group: &group.name,
            namespace: &options.namespace,
            azs: &group.azs,
            replicas: group.instances,
        };
        let mut group_instances = Vec::with_capacity(group.jobs.len());
        for job in &group.jobs {
            let spec = specs.load(&job.release, &job.name)?;
            let instances: Arc<[JobInstance]> =
                addressing::instances_for(placement, &job.name).into();
            providers.collect(job, spec, &instances)?;
            group_instances.push(instances);
        }
        addressed.push((group_index, group_instances));
    }
    info!(
        specs = specs.len(),
        links = providers.len(),
        "collected release specs and providers"
    );

    let renderer =
        RenderAdapter::new(ctx.fs.as_ref(), ctx.renderer.as_ref(), &layout, &manifest.name);
    let mut resolved = manifest.clone();
    for (group_index, group_instances) in addressed {
        let group = &manifest.instance_groups[group_index];
        for (job_index, (job, instances)) in group.jobs.iter().zip(group_instances).enumerate() {
            let spec = specs.load(&job.release, &job.name)?;
            let consumes = consumers::resolve(job, spec, &providers)?;
            let release = if manifest.has_release(&job.release) {
                Some(job.release.clone())
            } else {
                warn!(
                    job = %job.name,
                    release = %job.release,
                    "job release is not declared in the manifest"
                );
                None
            };
            let mut containerization = Containerization {
                instances: instances.iter().cloned().map(RenderedInstance::from).collect(),
                consumes,
                release,
                bpm: None,
            };

            // Templates see the links and instances gathered so far.
            let gathered = publish::to_property(&containerization)?;
            let rendered = renderer.render_job(job, spec, &instances, &gathered)?;
            (containerization.instances, containerization.bpm) =
                publish::deduplicate(&instances, rendered);

            resolved.instance_groups[group_index].jobs[job_index]
                .properties
                .insert(RESERVED_KEY, publish::to_property(&containerization)?);
        }
    }
    info!(deployment = %manifest.name, "resolved manifest");
    Ok(resolved)
}

/// Resolves `manifest` and publishes the result to the context's sink.
///
/// # Errors
///
/// Returns any error from [`gather`], or
/// [`GatherError::Output`](crate::error::GatherError::Output) if publishing
/// fails.
pub fn gather_and_publish(
    ctx: &ServiceContext,
    manifest: &Manifest,
    options: &GatherOptions,
) -> Result<Manifest> {
    let resolved = gather(ctx, manifest, options)?;
    publish::publish(ctx.sink.as_ref(), &resolved)?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::GatherError;
    use crate::property::{PropertyTree, PropertyValue};
    use crate::test_support::{add_job, context, MemFs};

    const MANIFEST: &str = r"
name: cf
releases:
- name: core
  version: '1.0'
instance_groups:
- name: db
  instances: 1
  azs: [z1]
  jobs:
  - name: postgres
    release: core
    properties:
      postgres:
        port: 6543
- name: api
  instances: 2
  azs: [z1, z2]
  jobs:
  - name: api
    release: core
    properties:
      api:
        workers: 4
";

    const POSTGRES_SPEC: &str = r"
properties:
  postgres.port: {default: 5432}
  postgres.user: {default: admin}
provides:
- name: db
  type: postgres
  properties: [postgres.port, postgres.user]
";

    const API_SPEC: &str = r"
properties:
  api.workers: {default: 1}
consumes:
- name: db
  type: postgres
- name: cache
  type: redis
  optional: true
";

    const POSTGRES_BPM: &str = "processes:\n- name: postgres\n  executable: /bin/postgres\n  \
        args: ['<%= p(\"postgres.port\") %>']\n";
    const API_BPM: &str = "processes:\n- name: api\n  executable: /bin/api\n  env:\n    \
        WORKERS: <%= p(\"api.workers\") %>\n";

    fn fixture() -> MemFs {
        let fs = MemFs::new();
        add_job(&fs, "/base", "core", "postgres", POSTGRES_SPEC, POSTGRES_BPM);
        add_job(&fs, "/base", "core", "api", API_SPEC, API_BPM);
        fs
    }

    fn options() -> GatherOptions {
        GatherOptions {
            base_dir: PathBuf::from("/base"),
            namespace: "cf-ns".into(),
            instance_groups: vec![],
        }
    }

    fn containerization(manifest: &Manifest, group: usize, job: usize) -> &PropertyTree {
        manifest.instance_groups[group].jobs[job]
            .properties
            .get(RESERVED_KEY)
            .and_then(PropertyValue::as_tree)
            .unwrap()
    }

    #[test]
    fn resolves_links_instances_and_shared_bpm() {
        let fs = fixture();
        let (ctx, _) = context(&fs);
        let resolved = gather(&ctx, &Manifest::from_yaml(MANIFEST).unwrap(), &options()).unwrap();

        let api = containerization(&resolved, 1, 0);
        assert_eq!(api.lookup("release"), Some(&PropertyValue::from("core")));
        let PropertyValue::List(instances) = api.get("instances").unwrap() else {
            panic!("instances should be a list")
        };
        assert_eq!(instances.len(), 4);
        assert_eq!(
            instances[3].as_tree().unwrap().get("address"),
            Some(&PropertyValue::from("api-3-api.cf-ns.svc.cluster.local"))
        );
        assert!(instances.iter().all(|i| i.as_tree().unwrap().get("bpm").is_none()));
        assert_eq!(api.lookup("bpm.processes").map(PropertyValue::kind), Some("sequence"));

        assert_eq!(
            api.lookup("consumes.db.properties.postgres.port"),
            Some(&PropertyValue::from(6543))
        );
        assert_eq!(
            api.lookup("consumes.db.properties.postgres.user"),
            Some(&PropertyValue::from("admin"))
        );
        assert!(api.lookup("consumes.cache").is_none());

        let db = containerization(&resolved, 0, 0);
        assert!(db.lookup("consumes").unwrap().as_tree().unwrap().is_empty());
    }

    #[test]
    fn differing_bpm_stays_per_instance() {
        let fs = fixture();
        add_job(
            &fs,
            "/base",
            "core",
            "api",
            API_SPEC,
            "processes:\n- name: api\n  executable: /bin/api\n  args: [<%= spec.id %>]\n",
        );
        let (ctx, _) = context(&fs);
        let resolved = gather(&ctx, &Manifest::from_yaml(MANIFEST).unwrap(), &options()).unwrap();

        let api = containerization(&resolved, 1, 0);
        assert!(api.get("bpm").is_none());
        let PropertyValue::List(instances) = api.get("instances").unwrap() else {
            panic!("instances should be a list")
        };
        assert!(instances.iter().all(|i| i.as_tree().unwrap().get("bpm").is_some()));
    }

    #[test]
    fn loads_each_spec_once_per_run() {
        let fs = fixture();
        let (ctx, _) = context(&fs);
        gather(&ctx, &Manifest::from_yaml(MANIFEST).unwrap(), &options()).unwrap();
        assert_eq!(fs.reads_of("/base/jobs-src/core/api/job.MF"), 1);
        assert_eq!(fs.reads_of("/base/jobs-src/core/postgres/job.MF"), 1);
    }

    #[test]
    fn filter_skips_unselected_groups() {
        let fs = fixture();
        let (ctx, _) = context(&fs);
        let opts = GatherOptions { instance_groups: vec!["db".into()], ..options() };
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        let resolved = gather(&ctx, &manifest, &opts).unwrap();

        assert!(resolved.instance_groups[0].jobs[0].properties.contains_key(RESERVED_KEY));
        assert_eq!(resolved.instance_groups[1], manifest.instance_groups[1]);
        assert_eq!(fs.reads_of("/base/jobs-src/core/api/job.MF"), 0);
    }

    #[test]
    fn mandatory_link_without_provider_fails() {
        let fs = fixture();
        let (ctx, sink) = context(&fs);
        let opts = GatherOptions { instance_groups: vec!["api".into()], ..options() };
        let err =
            gather_and_publish(&ctx, &Manifest::from_yaml(MANIFEST).unwrap(), &opts).unwrap_err();

        assert!(matches!(err, GatherError::UnresolvedLink { .. }));
        assert!(sink.documents().is_empty());
    }

    #[test]
    fn duplicate_provider_fails_the_run() {
        let fs = fixture();
        let (ctx, sink) = context(&fs);
        let manifest = MANIFEST.replace(
            "- name: api\n  instances: 2",
            "- name: db2\n  instances: 1\n  azs: [z1]\n  jobs:\n  - name: postgres\n    \
             release: core\n- name: api\n  instances: 2",
        );
        let err = gather_and_publish(&ctx, &Manifest::from_yaml(&manifest).unwrap(), &options())
            .unwrap_err();

        assert!(matches!(err, GatherError::DuplicateProvider { .. }));
        assert!(sink.documents().is_empty());
    }

    #[test]
    fn undeclared_release_is_omitted() {
        let fs = fixture();
        let (ctx, _) = context(&fs);
        let manifest = MANIFEST.replace("- name: core\n", "- name: other\n");
        let resolved = gather(&ctx, &Manifest::from_yaml(&manifest).unwrap(), &options()).unwrap();
        assert!(containerization(&resolved, 0, 0).get("release").is_none());
    }

    #[test]
    fn publishing_twice_is_byte_identical() {
        let fs = fixture();
        let (ctx, sink) = context(&fs);
        let manifest = Manifest::from_yaml(MANIFEST).unwrap();
        gather_and_publish(&ctx, &manifest, &options()).unwrap();
        gather_and_publish(&ctx, &manifest, &options()).unwrap();

        let documents = sink.documents();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0], documents[1]);
        assert!(documents[0].contains("bosh_containerization:"));
    }

    #[test]
    fn templates_read_consumed_link_instances() {
        let fs = fixture();
        add_job(
            &fs,
            "/base",
            "core",
            "api",
            API_SPEC,
            "processes:\n- name: api\n  executable: /bin/api\n  env:\n    \
             DB: '<%= p(\"bosh_containerization.consumes.db.instances\") %>'\n",
        );
        let (ctx, _) = context(&fs);
        let resolved = gather(&ctx, &Manifest::from_yaml(MANIFEST).unwrap(), &options()).unwrap();

        let PropertyValue::List(processes) =
            containerization(&resolved, 1, 0).lookup("bpm.processes").unwrap()
        else {
            panic!("processes should be a list")
        };
        let db = processes[0].as_tree().unwrap().lookup("env.DB").unwrap().as_str().unwrap();
        assert!(db.contains("db-0-postgres.cf-ns.svc.cluster.local"), "{db}");
    }

    #[test]
    fn unselected_groups_and_unknown_keys_are_published_verbatim() {
        let input = r"
name: cf
instance_groups:
- name: db
  instances: 1
  azs: [z1]
  jobs:
  - name: postgres
    release: core
- name: legacy
  instances: 1
  vm_type: small
  jobs:
  - name: cron
    release: ops
    custom_provider_definitions: [{name: x, type: y}]
variables:
- name: admin_password
  type: password
  update_mode: converge
";
        let fs = fixture();
        let (ctx, sink) = context(&fs);
        let opts = GatherOptions { instance_groups: vec!["db".into()], ..options() };
        gather_and_publish(&ctx, &Manifest::from_yaml(input).unwrap(), &opts).unwrap();

        let before: serde_yaml::Value = serde_yaml::from_str(input).unwrap();
        let after: serde_yaml::Value = serde_yaml::from_str(&sink.documents()[0]).unwrap();
        assert_eq!(after["instance_groups"][1], before["instance_groups"][1]);
        assert_eq!(after["variables"], before["variables"]);
        assert!(after.get("releases").is_none());
    }
}
