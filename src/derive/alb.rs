//! ALB ingress annotations that do not depend on HTTPS

use compose_tree::{get, ConfigNode, TreePath};

use super::{Derivation, DerivedEntry};

pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";
pub const SCHEME_ANNOTATION: &str = "alb.ingress.kubernetes.io/scheme";
pub const HEALTHCHECK_PATH_ANNOTATION: &str = "alb.ingress.kubernetes.io/healthcheck-path";
pub const HEALTHCHECK_PORT_ANNOTATION: &str = "alb.ingress.kubernetes.io/healthcheck-port";

/// Render a scalar as an annotation string. Mappings, lists and null have
/// no annotation form.
pub(crate) fn annotation_value(node: &ConfigNode) -> Option<String> {
    match node {
        ConfigNode::String(s) => Some(s.clone()),
        ConfigNode::Number(n) => Some(n.to_string()),
        ConfigNode::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Routes the ingress to the AWS load balancer controller
pub struct IngressClass;

impl Derivation for IngressClass {
    fn name(&self) -> &'static str {
        "ingress-class"
    }

    fn derive(&self, _filled: &ConfigNode) -> Vec<DerivedEntry> {
        vec![DerivedEntry::annotation(self.name(), INGRESS_CLASS_ANNOTATION, "alb")]
    }
}

/// Load balancer scheme annotation from `loadBalancerScheme`
pub struct LoadBalancerScheme {
    pub annotation: &'static str,
}

impl LoadBalancerScheme {
    pub fn alb() -> Self {
        Self {
            annotation: SCHEME_ANNOTATION,
        }
    }

    pub fn nlb() -> Self {
        Self {
            annotation: super::nlb::NLB_SCHEME_ANNOTATION,
        }
    }
}

impl Derivation for LoadBalancerScheme {
    fn name(&self) -> &'static str {
        "load-balancer-scheme"
    }

    fn derive(&self, filled: &ConfigNode) -> Vec<DerivedEntry> {
        get(filled, &TreePath::new(["loadBalancerScheme"]))
            .and_then(annotation_value)
            .map(|scheme| vec![DerivedEntry::annotation(self.name(), self.annotation, scheme)])
            .unwrap_or_default()
    }
}

/// Healthcheck annotations from the component-owned healthcheck fields
pub struct Healthcheck;

impl Derivation for Healthcheck {
    fn name(&self) -> &'static str {
        "healthcheck"
    }

    fn derive(&self, filled: &ConfigNode) -> Vec<DerivedEntry> {
        [
            ("healthcheckPath", HEALTHCHECK_PATH_ANNOTATION),
            ("healthcheckPort", HEALTHCHECK_PORT_ANNOTATION),
        ]
        .into_iter()
        .filter_map(|(field, annotation)| {
            get(filled, &TreePath::new([field]))
                .and_then(annotation_value)
                .map(|value| DerivedEntry::annotation(self.name(), annotation, value))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scheme_annotation() {
        let entries = LoadBalancerScheme::alb().derive(&json!({"loadBalancerScheme": "internal"}));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, json!("internal"));
        assert!(LoadBalancerScheme::alb().derive(&json!({})).is_empty());

        let entries = LoadBalancerScheme::nlb().derive(&json!({"loadBalancerScheme": "internal"}));
        assert_eq!(
            entries[0].path.segments()[2],
            "service.beta.kubernetes.io/aws-load-balancer-scheme"
        );
    }

    #[test]
    fn test_healthcheck_port_rendered_as_string() {
        let entries = Healthcheck.derive(&json!({
            "healthcheckPath": "/v1/blocks/count",
            "healthcheckPort": 5000
        }));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, json!("/v1/blocks/count"));
        assert_eq!(entries[1].value, json!("5000"));
    }

    #[test]
    fn test_annotation_value() {
        assert_eq!(annotation_value(&json!(true)), Some("true".to_string()));
        assert_eq!(annotation_value(&json!({"a": 1})), None);
        assert_eq!(annotation_value(&json!(null)), None);
    }
}
