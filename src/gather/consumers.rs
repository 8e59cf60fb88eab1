//! Binding of consumed links to providers.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{GatherError, Result};
use crate::manifest::{Job, JobLink, JobSpec, LinkConsumer};
use crate::property::PropertyValue;

use super::providers::ProviderTable;

/// Resolves every link `job` consumes against the provider table.
///
/// The result is keyed by the declared consumer name, even when the
/// manifest redirects the lookup with `from`. Optional consumers without a
/// provider are left out.
///
/// When the job has a `consumes` block in the manifest, consumers it does
/// not mention (or maps to `null`) are considered intentionally nulled:
/// skipped when optional, an error otherwise.
///
/// # Errors
///
/// Returns [`GatherError::MandatoryLinkNulled`],
/// [`GatherError::UnresolvedLink`] or, for malformed overrides,
/// [`GatherError::TypeMismatch`].
pub fn resolve(
    job: &Job,
    spec: &JobSpec,
    providers: &ProviderTable,
) -> Result<BTreeMap<String, JobLink>> {
    let mut resolved = BTreeMap::new();
    for consumer in &spec.consumes {
        let Some(lookup) = lookup_name(job, consumer)? else {
            debug!(job = %job.name, consumer = %consumer.name, "optional link nulled in manifest");
            continue;
        };
        match providers.get(&consumer.link_type, &lookup) {
            Some(link) => {
                debug!(
                    job = %job.name,
                    consumer = %consumer.name,
                    provider = %lookup,
                    "resolved link"
                );
                resolved.insert(consumer.name.clone(), link.clone());
            }
            None if consumer.optional => {
                debug!(job = %job.name, consumer = %consumer.name, "optional link has no provider");
            }
            None => {
                return Err(GatherError::UnresolvedLink {
                    job: job.name.clone(),
                    consumer: consumer.name.clone(),
                    lookup,
                    link_type: consumer.link_type.clone(),
                })
            }
        }
    }
    Ok(resolved)
}

/// Provider name to look up, or `None` for an optional consumer the
/// manifest leaves out.
fn lookup_name(job: &Job, consumer: &LinkConsumer) -> Result<Option<String>> {
    let Some(overrides) = &job.consumes else {
        return Ok(Some(consumer.name.clone()));
    };
    let context = format!("consumes.{} of job {}", consumer.name, job.name);
    match overrides.get(&consumer.name) {
        None | Some(PropertyValue::Null) if consumer.optional => Ok(None),
        None | Some(PropertyValue::Null) => Err(GatherError::MandatoryLinkNulled {
            job: job.name.clone(),
            consumer: consumer.name.clone(),
        }),
        Some(PropertyValue::Map(settings)) => match settings.get("from") {
            None => Ok(Some(consumer.name.clone())),
            Some(PropertyValue::String(from)) => Ok(Some(from.clone())),
            Some(other) => Err(GatherError::TypeMismatch {
                context: format!("{context}.from"),
                found: other.kind(),
                expected: "string",
            }),
        },
        Some(other) => {
            Err(GatherError::TypeMismatch { context, found: other.kind(), expected: "mapping" })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::manifest::JobInstance;
    use crate::property::PropertyTree;

    fn job(yaml: &str) -> Job {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn spec(yaml: &str) -> JobSpec {
        JobSpec::from_yaml(yaml).unwrap()
    }

    fn link(id: &str) -> JobLink {
        let instance = JobInstance {
            address: format!("{id}.ns.svc.cluster.local"),
            az: "z1".into(),
            id: id.into(),
            index: 0,
            instance: 0,
            name: id.into(),
        };
        JobLink { instances: vec![instance].into(), properties: PropertyTree::new() }
    }

    fn providers() -> ProviderTable {
        let mut table = ProviderTable::default();
        table.register("postgres", "db", link("g-0-db")).unwrap();
        table.register("postgres", "replica", link("g-0-replica")).unwrap();
        table
    }

    const CONSUMER_SPEC: &str = r"
consumes:
- name: db
  type: postgres
- name: cache
  type: redis
  optional: true
";

    #[test]
    fn resolves_mandatory_and_skips_missing_optional() {
        let links =
            resolve(&job("name: api\nrelease: r\n"), &spec(CONSUMER_SPEC), &providers()).unwrap();
        assert_eq!(links.keys().collect::<Vec<_>>(), vec!["db"]);
        assert_eq!(links["db"].instances[0].id, "g-0-db");
    }

    #[test]
    fn shares_provider_instances() {
        let table = providers();
        let links = resolve(&job("name: api\nrelease: r\n"), &spec(CONSUMER_SPEC), &table).unwrap();
        let provided = table.get("postgres", "db").unwrap();
        assert!(Arc::ptr_eq(&links["db"].instances, &provided.instances));
    }

    #[test]
    fn from_redirects_lookup_but_keeps_declared_key() {
        let api = job("name: api\nrelease: r\nconsumes:\n  db: {from: replica}\n");
        let links = resolve(&api, &spec(CONSUMER_SPEC), &providers()).unwrap();
        assert_eq!(links["db"].instances[0].id, "g-0-replica");
        assert!(!links.contains_key("replica"));
    }

    #[test]
    fn unresolved_mandatory_link_fails() {
        let api = job("name: api\nrelease: r\n");
        let err = resolve(&api, &spec(CONSUMER_SPEC), &ProviderTable::default()).unwrap_err();
        assert!(
            matches!(err, GatherError::UnresolvedLink { ref consumer, .. } if consumer == "db")
        );
    }

    #[test]
    fn redirect_to_missing_provider_fails() {
        let api = job("name: api\nrelease: r\nconsumes:\n  db: {from: nowhere}\n");
        let err = resolve(&api, &spec(CONSUMER_SPEC), &providers()).unwrap_err();
        assert!(
            matches!(err, GatherError::UnresolvedLink { ref lookup, .. } if lookup == "nowhere")
        );
    }

    #[test]
    fn unmentioned_mandatory_consumer_is_nulled() {
        let api = job("name: api\nrelease: r\nconsumes:\n  cache: {from: redis}\n");
        let err = resolve(&api, &spec(CONSUMER_SPEC), &providers()).unwrap_err();
        assert!(
            matches!(err, GatherError::MandatoryLinkNulled { ref consumer, .. } if consumer == "db")
        );
    }

    #[test]
    fn null_mandatory_consumer_is_nulled() {
        let api = job("name: api\nrelease: r\nconsumes:\n  db: ~\n");
        let err = resolve(&api, &spec(CONSUMER_SPEC), &providers()).unwrap_err();
        assert!(matches!(err, GatherError::MandatoryLinkNulled { .. }));
    }

    #[test]
    fn unmentioned_optional_consumer_is_skipped() {
        let mut table = providers();
        table.register("redis", "cache", link("g-0-cache")).unwrap();
        let api = job("name: api\nrelease: r\nconsumes:\n  db: {}\n");
        let links = resolve(&api, &spec(CONSUMER_SPEC), &table).unwrap();
        assert_eq!(links.keys().collect::<Vec<_>>(), vec!["db"]);
    }

    #[test]
    fn no_consumers_yields_empty_map() {
        let links =
            resolve(&job("name: api\nrelease: r\n"), &JobSpec::default(), &providers()).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn non_string_from_is_a_type_mismatch() {
        let api = job("name: api\nrelease: r\nconsumes:\n  db: {from: [a]}\n");
        let err = resolve(&api, &spec(CONSUMER_SPEC), &providers()).unwrap_err();
        assert!(matches!(
            err,
            GatherError::TypeMismatch { found: "sequence", expected: "string", .. }
        ));
    }

    #[test]
    fn scalar_override_is_a_type_mismatch() {
        let api = job("name: api\nrelease: r\nconsumes:\n  db: replica\n");
        let err = resolve(&api, &spec(CONSUMER_SPEC), &providers()).unwrap_err();
        assert!(matches!(
            err,
            GatherError::TypeMismatch { found: "string", expected: "mapping", .. }
        ));
    }
}
