//! `CDNStatus` custom resource: the persisted record of which ingresses
//! currently feed a distribution.
//!
//! Helpers here never mutate `self`; each returns an updated copy so callers
//! can keep the observed object around while they compute the next one.

#![forbid(unsafe_code)]

use kube::{CustomResource, Resource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{IngressRef, IngressRefs};

/// Cluster-scoped; all state lives in the status subresource.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "cdn.gympass.com",
    version = "v1alpha1",
    kind = "CDNStatus",
    plural = "cdnstatuses",
    status = "CdnStatusStatus",
    derive = "Default",
    derive = "PartialEq",
    printcolumn = r#"{"name":"ID","type":"string","jsonPath":".status.id"}"#,
    printcolumn = r#"{"name":"Aliases","type":"string","jsonPath":".status.aliases"}"#,
    printcolumn = r#"{"name":"Address","type":"string","jsonPath":".status.address"}"#
)]
pub struct CdnStatusSpec {}

/// Generated root type, named in the crate's casing.
pub type CdnStatus = CDNStatus;

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CdnStatusStatus {
    /// Distribution ID assigned by the CDN provider
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub arn: String,
    /// Distribution domain name
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "IngressRefs::is_empty")]
    pub ingresses: IngressRefs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DnsStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<String>,
    #[serde(default)]
    pub synced: bool,
}

impl CdnStatus {
    /// Empty record for a distribution group.
    pub fn named(name: impl Into<String>) -> Self {
        let name: String = name.into();
        let mut s = Self::new(&name, CdnStatusSpec::default());
        s.status = Some(CdnStatusStatus::default());
        s
    }

    /// Tracked ingresses; empty when the status subresource was never written.
    pub fn ingresses(&self) -> IngressRefs {
        self.status.as_ref().map(|s| s.ingresses.clone()).unwrap_or_default()
    }

    pub fn has_ingress_ref<K: Resource>(&self, obj: &K) -> bool {
        self.status
            .as_ref()
            .map(|s| s.ingresses.contains_key(&IngressRef::from_resource(obj)))
            .unwrap_or(false)
    }

    /// Tracked refs in `namespace/name` order.
    pub fn ingress_keys(&self) -> Vec<IngressRef> {
        let mut keys: Vec<IngressRef> = self
            .status
            .as_ref()
            .map(|s| s.ingresses.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Copy with `ingresses` replaced.
    pub fn with_ingresses(&self, ingresses: IngressRefs) -> Self {
        self.map_status(|s| s.ingresses = ingresses)
    }

    /// Copy with `obj` tracked under `label`.
    pub fn with_ingress_ref<K: Resource>(&self, label: &str, obj: &K) -> Self {
        let key = IngressRef::from_resource(obj);
        self.map_status(|s| {
            s.ingresses.insert(key, label.to_string());
        })
    }

    pub fn with_info(&self, id: &str, arn: &str, address: &str) -> Self {
        self.map_status(|s| {
            s.id = id.to_string();
            s.arn = arn.to_string();
            s.address = address.to_string();
        })
    }

    pub fn with_aliases(&self, aliases: Vec<String>) -> Self {
        self.map_status(|s| s.aliases = aliases)
    }

    pub fn with_dns(&self, records: Vec<String>, synced: bool) -> Self {
        self.map_status(|s| s.dns = Some(DnsStatus { records, synced }))
    }

    fn map_status(&self, f: impl FnOnce(&mut CdnStatusStatus)) -> Self {
        let mut next = self.clone();
        f(next.status.get_or_insert_with(CdnStatusStatus::default));
        next
    }
}
