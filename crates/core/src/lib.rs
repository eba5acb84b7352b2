//! CDN origin core types: ingress references and the tracked-status map.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use kube::Resource;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod status;

pub use status::{CDNStatus, CdnStatus, CdnStatusSpec, CdnStatusStatus, DnsStatus};

/// Sync-state label for an ingress whose routing is reflected in the distribution.
pub const SYNCED: &str = "Synced";
/// Sync-state label for an ingress whose last reconcile failed.
pub const FAILED: &str = "Failed";

/// Mapping from ingress reference to its sync-state label.
/// Iteration order is unspecified.
pub type IngressRefs = FxHashMap<IngressRef, String>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IngressRefError {
    #[error("ingress ref {0:?} is missing the namespace/name separator")]
    MissingSeparator(String),
    #[error("ingress ref {0:?} has a namespace that is not valid percent-encoded UTF-8")]
    BadNamespace(String),
}

/// Namespace + name key of a watched ingress.
///
/// Equality and hashing are by field. The text form is `namespace/name`,
/// which is also how the key is stored in the status subresource. The
/// namespace is percent-encoded and the name follows the first `/` verbatim,
/// so every ref reads back as itself, including empty names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IngressRef {
    namespace: String,
    name: String,
}

impl IngressRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), name: name.into() }
    }

    /// Build a ref from any object's metadata. Cluster-scoped objects get an empty namespace.
    pub fn from_resource<K: Resource>(obj: &K) -> Self {
        let meta = obj.meta();
        Self::new(
            meta.namespace.clone().unwrap_or_default(),
            meta.name.clone().unwrap_or_default(),
        )
    }

    pub fn namespace(&self) -> &str { &self.namespace }
    pub fn name(&self) -> &str { &self.name }

    /// True when `obj` has this ref's namespace and name.
    pub fn matches<K: Resource>(&self, obj: &K) -> bool {
        let meta = obj.meta();
        meta.namespace.as_deref().unwrap_or("") == self.namespace
            && meta.name.as_deref().unwrap_or("") == self.name
    }
}

impl fmt::Display for IngressRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", urlencoding::encode(&self.namespace), self.name)
    }
}

impl FromStr for IngressRef {
    type Err = IngressRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) = s
            .split_once('/')
            .ok_or_else(|| IngressRefError::MissingSeparator(s.to_string()))?;
        let namespace = urlencoding::decode(namespace)
            .map_err(|_| IngressRefError::BadNamespace(s.to_string()))?;
        Ok(Self::new(namespace, name))
    }
}

impl Serialize for IngressRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IngressRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

pub mod prelude {
    pub use super::{
        CDNStatus, CdnStatus, CdnStatusSpec, CdnStatusStatus, DnsStatus, IngressRef, IngressRefError,
        IngressRefs, FAILED, SYNCED,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::networking::v1::Ingress;

    fn ingress(ns: Option<&str>, name: &str) -> Ingress {
        let mut ing = Ingress::default();
        ing.metadata.name = Some(name.to_string());
        ing.metadata.namespace = ns.map(|s| s.to_string());
        ing
    }

    #[test]
    fn refs_compare_by_field() {
        let a = IngressRef::new("default", "web");
        let b = IngressRef::new(String::from("default"), String::from("web"));
        assert_eq!(a, b);

        let mut refs = IngressRefs::default();
        refs.insert(a, SYNCED.to_string());
        refs.insert(b, FAILED.to_string());
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[&IngressRef::new("default", "web")], FAILED);
    }

    #[test]
    fn display_and_parse() {
        let r = IngressRef::new("team-a", "api");
        assert_eq!(r.to_string(), "team-a/api");
        assert_eq!("team-a/api".parse::<IngressRef>().unwrap(), r);
        assert_eq!("/global".parse::<IngressRef>().unwrap(), IngressRef::new("", "global"));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(
            "no-separator".parse::<IngressRef>().unwrap_err(),
            IngressRefError::MissingSeparator("no-separator".into())
        );
        assert_eq!("%FF/web".parse::<IngressRef>().unwrap_err(), IngressRefError::BadNamespace("%FF/web".into()));
    }

    #[test]
    fn text_form_reads_back_for_odd_refs() {
        let odd = [
            IngressRef::new("ns", ""),
            IngressRef::new("", ""),
            IngressRef::new("a/b", "c"),
            IngressRef::new("ns", "x/y"),
            IngressRef::new("100%", "web"),
            IngressRef::new("ns%2F", "web"),
        ];
        for r in odd {
            let text = r.to_string();
            assert_eq!(text.parse::<IngressRef>().unwrap(), r, "text: {}", text);
        }
        assert_eq!(IngressRef::new("a/b", "c").to_string(), "a%2Fb/c");
    }

    #[test]
    fn nameless_object_survives_status_round_trip() {
        let mut refs = IngressRefs::default();
        refs.insert(IngressRef::from_resource(&Ingress::default()), SYNCED.to_string());
        refs.insert(IngressRef::new("ns", ""), SYNCED.to_string());
        let text = serde_json::to_string(&refs).unwrap();
        let back: IngressRefs = serde_json::from_str(&text).unwrap();
        assert_eq!(back, refs);
    }

    #[test]
    fn from_resource_reads_metadata() {
        let r = IngressRef::from_resource(&ingress(Some("prod"), "shop"));
        assert_eq!(r.namespace(), "prod");
        assert_eq!(r.name(), "shop");
        assert!(r.matches(&ingress(Some("prod"), "shop")));
        assert!(!r.matches(&ingress(Some("stage"), "shop")));

        let cluster = IngressRef::from_resource(&ingress(None, "edge"));
        assert_eq!(cluster, IngressRef::new("", "edge"));
    }

    #[test]
    fn refs_serialize_as_map_keys() {
        let mut refs = IngressRefs::default();
        refs.insert(IngressRef::new("ns", "a"), SYNCED.to_string());
        let v = serde_json::to_value(&refs).unwrap();
        assert_eq!(v, serde_json::json!({ "ns/a": "Synced" }));

        let back: IngressRefs = serde_json::from_value(v).unwrap();
        assert_eq!(back, refs);

        let bad = serde_json::from_value::<IngressRefs>(serde_json::json!({ "oops": "Synced" }));
        assert!(bad.is_err());
    }
}
