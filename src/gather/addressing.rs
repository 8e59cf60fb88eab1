//! Deterministic instance identities.

use crate::manifest::JobInstance;

/// Where a job is placed: its group, zones and replica count.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    /// Instance group name.
    pub group: &'a str,
    /// Namespace used in instance addresses.
    pub namespace: &'a str,
    /// Availability zones, in declaration order.
    pub azs: &'a [String],
    /// Replicas per zone.
    pub replicas: usize,
}

/// Generates the instances of `job` for a placement.
///
/// Replicas are the outer loop and zones the inner one, so with two replicas
/// over `[z1, z2]` the indices run `z1, z2, z1, z2`. The index is the
/// running count of instances generated so far and ids derive from it,
/// which keeps ids stable for a given manifest.
#[must_use]
pub fn instances_for(placement: Placement<'_>, job: &str) -> Vec<JobInstance> {
    let Placement { group, namespace, azs, replicas } = placement;
    let name = format!("{group}-{job}");
    let mut instances = Vec::with_capacity(replicas * azs.len());
    for replica in 0..replicas {
        for az in azs {
            let index = instances.len();
            let id = format!("{group}-{index}-{job}");
            let address = format!("{id}.{namespace}.svc.cluster.local");
            instances.push(JobInstance {
                address,
                az: az.clone(),
                id,
                index,
                instance: replica,
                name: name.clone(),
            });
        }
    }
    instances
}
