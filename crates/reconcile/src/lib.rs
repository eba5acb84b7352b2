//! Reconcile diffs: which configured entries are stale, and which status
//! entries belong to a given ingress.
//!
//! Everything here is a pure function over borrowed inputs. Callers may hold
//! the same status or identifier lists across concurrent reconcile passes.

#![forbid(unsafe_code)]

use cdn_origin_core::{CdnStatus, IngressRef, IngressRefs};
use kube::Resource;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Elements of `current` that appear nowhere in `desired`, in `current` order.
///
/// Comparison is exact. Duplicates in `current` are kept. An empty result
/// means nothing to delete.
pub fn get_deletions<D, C>(desired: &[D], current: &[C]) -> Vec<String>
where
    D: AsRef<str>,
    C: AsRef<str>,
{
    if current.is_empty() {
        return Vec::new();
    }
    let want: FxHashSet<&str> = desired.iter().map(|d| d.as_ref()).collect();
    current
        .iter()
        .map(|c| c.as_ref())
        .filter(|id| !want.contains(id))
        .map(str::to_string)
        .collect()
}

/// Copy of `refs` without `target`.
pub fn without_ref(refs: &IngressRefs, target: &IngressRef) -> IngressRefs {
    refs.iter()
        .filter(|(k, _)| *k != target)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Copy of `status` with every ingress entry for `target` removed.
/// All other fields and entries are carried over unchanged; a record without
/// a status subresource comes back as an equal copy.
pub fn filter_ingress_ref<K: Resource>(status: &CdnStatus, target: &K) -> CdnStatus {
    let Some(refs) = status.status.as_ref().map(|s| &s.ingresses) else {
        return status.clone();
    };
    let key = IngressRef::from_resource(target);
    status.with_ingresses(without_ref(refs, &key))
}

/// Identifiers configured on a distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionState {
    /// Origin IDs
    #[serde(default)]
    pub origins: Vec<String>,
    /// Cache-behavior path patterns
    #[serde(default)]
    pub behaviors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilePlan {
    pub origin_deletions: Vec<String>,
    pub behavior_deletions: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.origin_deletions.is_empty() && self.behavior_deletions.is_empty()
    }
}

/// Stale origins and behaviors to remove when moving `current` to `desired`.
pub fn plan(desired: &DistributionState, current: &DistributionState) -> ReconcilePlan {
    let out = ReconcilePlan {
        origin_deletions: get_deletions(&desired.origins, &current.origins),
        behavior_deletions: get_deletions(&desired.behaviors, &current.behaviors),
    };
    debug!(
        origins = out.origin_deletions.len(),
        behaviors = out.behavior_deletions.len(),
        "reconcile plan computed"
    );
    out
}
