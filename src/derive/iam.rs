//! IAM statements derived from configuration

use serde_json::json;

use compose_tree::{get, ConfigNode, TreePath};

use super::{Derivation, DerivedEntry};

const ALL_HOSTED_ZONES: &str = "arn:aws:route53:::hostedzone/*";

/// Route53 statements for external-dns, scoped to `zoneIdFilters`.
///
/// A null, missing or empty filter list scopes record changes to every
/// hosted zone.
pub struct HostedZoneStatements;

impl HostedZoneStatements {
    fn hosted_zone_resources(filled: &ConfigNode) -> Vec<ConfigNode> {
        let resources: Vec<ConfigNode> = get(filled, &TreePath::new(["zoneIdFilters"]))
            .and_then(ConfigNode::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(ConfigNode::as_str)
                    .filter(|id| !id.is_empty())
                    .map(|id| ConfigNode::String(format!("arn:aws:route53:::hostedzone/{}", id)))
                    .collect()
            })
            .unwrap_or_default();

        if resources.is_empty() {
            vec![ConfigNode::String(ALL_HOSTED_ZONES.to_string())]
        } else {
            resources
        }
    }
}

impl Derivation for HostedZoneStatements {
    fn name(&self) -> &'static str {
        "hosted-zone-statements"
    }

    fn derive(&self, filled: &ConfigNode) -> Vec<DerivedEntry> {
        let statements = json!([
            {
                "Effect": "Allow",
                "Action": ["route53:ChangeResourceRecordSets"],
                "Resource": Self::hosted_zone_resources(filled)
            },
            {
                "Effect": "Allow",
                "Action": ["route53:ListHostedZones", "route53:ListResourceRecordSets"],
                "Resource": ["*"]
            }
        ]);
        vec![DerivedEntry::new(self.name(), TreePath::new(["Statement"]), statements)]
    }
}
