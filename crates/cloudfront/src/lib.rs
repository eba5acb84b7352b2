//! CloudFront request shapes: origin access control for S3 origins.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// `OriginAccessControlOriginTypes` value for S3 bucket origins.
pub const ORIGIN_TYPE_S3: &str = "s3";
/// `OriginAccessControlSigningBehaviors` value: sign every origin request.
pub const SIGNING_BEHAVIOR_ALWAYS: &str = "always";
/// `OriginAccessControlSigningProtocols` value for SigV4.
pub const SIGNING_PROTOCOL_SIGV4: &str = "sigv4";

/// Origin access control fronting an S3 origin.
///
/// Built as a creation request; `id` stays empty until the provider assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Oac {
    pub id: String,
    pub name: String,
    pub origin_name: String,
    pub origin_access_control_origin_type: String,
    pub signing_behavior: String,
    pub signing_protocol: String,
}

impl Oac {
    /// OAC for `origin_host` on `distribution`. Inputs are not validated.
    pub fn new(distribution: &str, origin_host: &str) -> Self {
        Self {
            id: String::new(),
            name: oac_name(distribution, origin_host),
            origin_name: origin_host.to_string(),
            origin_access_control_origin_type: ORIGIN_TYPE_S3.to_string(),
            signing_behavior: SIGNING_BEHAVIOR_ALWAYS.to_string(),
            signing_protocol: SIGNING_PROTOCOL_SIGV4.to_string(),
        }
    }

    /// Copy carrying the provider-assigned ID.
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self { id: id.into(), ..self.clone() }
    }
}

/// `<distribution>-<bucket>`, where bucket is the host's first DNS label.
fn oac_name(distribution: &str, s3_host: &str) -> String {
    let bucket = s3_host.split('.').next().unwrap_or_default();
    format!("{}-{}", distribution, bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_uses_first_label() {
        assert_eq!(Oac::new("dist", "my-bucket.s3.amazonaws.com").name, "dist-my-bucket");
        assert_eq!(Oac::new("dist", "single-label").name, "dist-single-label");
        assert_eq!(Oac::new("dist", "").name, "dist-");
        assert_eq!(Oac::new("dist", ".s3.amazonaws.com").name, "dist-");
    }

    #[test]
    fn policy_fields_are_fixed() {
        for (d, h) in [("a", "b.s3.amazonaws.com"), ("", ""), ("x", "y")] {
            let oac = Oac::new(d, h);
            assert_eq!(oac.id, "");
            assert_eq!(oac.origin_name, h);
            assert_eq!(oac.origin_access_control_origin_type, "s3");
            assert_eq!(oac.signing_behavior, "always");
            assert_eq!(oac.signing_protocol, "sigv4");
        }
    }

    #[test]
    fn same_inputs_same_descriptor() {
        assert_eq!(Oac::new("d", "b.s3.amazonaws.com"), Oac::new("d", "b.s3.amazonaws.com"));
    }

    #[test]
    fn with_id_fills_only_id() {
        let oac = Oac::new("dist", "assets.s3.us-east-1.amazonaws.com");
        let created = oac.with_id("E3OAC123");
        assert_eq!(created.id, "E3OAC123");
        assert_eq!(created.name, oac.name);
        assert_eq!(oac.id, "");
    }

    #[test]
    fn serializes_camel_case() {
        let v = serde_json::to_value(Oac::new("dist", "bucket.s3.amazonaws.com")).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "id": "",
                "name": "dist-bucket",
                "originName": "bucket.s3.amazonaws.com",
                "originAccessControlOriginType": "s3",
                "signingBehavior": "always",
                "signingProtocol": "sigv4",
            })
        );
    }
}
