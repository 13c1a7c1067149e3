//! Network load balancer service annotations

use compose_tree::{get, ConfigNode, TreePath};

use super::alb::annotation_value;
use super::{Derivation, DerivedEntry};

pub const NLB_TYPE_ANNOTATION: &str = "service.beta.kubernetes.io/aws-load-balancer-type";
pub const NLB_SCHEME_ANNOTATION: &str = "service.beta.kubernetes.io/aws-load-balancer-scheme";
pub const EXTERNAL_DNS_HOSTNAME_ANNOTATION: &str = "external-dns.alpha.kubernetes.io/hostname";

/// Load balancer type and, when a hostname is set, the external-dns record
pub struct NlbAnnotations;

impl Derivation for NlbAnnotations {
    fn name(&self) -> &'static str {
        "nlb-annotations"
    }

    fn derive(&self, filled: &ConfigNode) -> Vec<DerivedEntry> {
        let mut entries = vec![DerivedEntry::annotation(self.name(), NLB_TYPE_ANNOTATION, "nlb-ip")];
        // An empty record would ask external-dns for a nameless entry
        if let Some(hostname) = get(filled, &TreePath::new(["hostname"]))
            .and_then(annotation_value)
            .filter(|h| !h.is_empty())
        {
            entries.push(DerivedEntry::annotation(
                self.name(),
                EXTERNAL_DNS_HOSTNAME_ANNOTATION,
                hostname,
            ));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hostname_omitted_when_unset() {
        for filled in [json!({}), json!({"hostname": ""}), json!({"hostname": null})] {
            let entries = NlbAnnotations.derive(&filled);
            assert_eq!(entries.len(), 1, "{}", filled);
            assert_eq!(entries[0].value, json!("nlb-ip"));
        }
    }

    #[test]
    fn test_hostname() {
        let entries = NlbAnnotations.derive(&json!({"hostname": "p2p.example.com"}));
        assert_eq!(entries[1].value, json!("p2p.example.com"));
    }
}
