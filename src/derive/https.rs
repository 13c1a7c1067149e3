//! HTTPS enablement for ALB ingresses
//!
//! HTTPS is on when the ingress names a host, carries a TLS list, or the
//! user already set the ALB certificate ARN annotation. TLS certificates are
//! then discovered by the load balancer controller from those fields.

use serde_json::json;

use compose_tree::{get, is_present, ConfigNode, TreePath};

use super::{annotation_path, Derivation, DerivedEntry};

pub const LISTEN_PORTS_ANNOTATION: &str = "alb.ingress.kubernetes.io/listen-ports";
pub const CERTIFICATE_ARN_ANNOTATION: &str = "alb.ingress.kubernetes.io/certificate-arn";
pub const FORCE_SSL_REDIRECT_ANNOTATION: &str = "ingress.kubernetes.io/force-ssl-redirect";
pub const SSL_REDIRECT_ACTION_ANNOTATION: &str = "alb.ingress.kubernetes.io/actions.ssl-redirect";

const HTTP_ONLY_PORTS: &str = r#"[{"HTTP": 80}]"#;
const HTTP_AND_HTTPS_PORTS: &str = r#"[{"HTTP": 80}, {"HTTPS":443}]"#;
const SSL_REDIRECT_ACTION: &str = r#"{"Type": "redirect", "RedirectConfig": { "Protocol": "HTTPS", "Port": "443", "StatusCode": "HTTP_301"}}"#;

/// Service name the redirect rule routes to; the ALB resolves it from the
/// `actions.ssl-redirect` annotation.
pub const REDIRECT_SERVICE: &str = "ssl-redirect";

/// True iff the tree has a host, a non-empty TLS list, or a certificate
/// ARN annotation.
pub fn https_enabled(tree: &ConfigNode) -> bool {
    is_present(get(tree, &TreePath::new(["host"])))
        || is_present(get(tree, &TreePath::new(["tls"])))
        || is_present(get(tree, &annotation_path(CERTIFICATE_ARN_ANNOTATION)))
}

/// Listener declaration: HTTP only, or HTTP and HTTPS
pub struct ListenerPorts;

impl Derivation for ListenerPorts {
    fn name(&self) -> &'static str {
        "listener-ports"
    }

    fn derive(&self, filled: &ConfigNode) -> Vec<DerivedEntry> {
        let ports = if https_enabled(filled) {
            HTTP_AND_HTTPS_PORTS
        } else {
            HTTP_ONLY_PORTS
        };
        vec![DerivedEntry::annotation(self.name(), LISTEN_PORTS_ANNOTATION, ports)]
    }
}

/// Forced redirect flag and the redirect action, HTTPS only
pub struct SslRedirect;

impl Derivation for SslRedirect {
    fn name(&self) -> &'static str {
        "ssl-redirect"
    }

    fn derive(&self, filled: &ConfigNode) -> Vec<DerivedEntry> {
        if !https_enabled(filled) {
            return Vec::new();
        }
        vec![
            DerivedEntry::annotation(self.name(), FORCE_SSL_REDIRECT_ANNOTATION, "true"),
            DerivedEntry::annotation(self.name(), SSL_REDIRECT_ACTION_ANNOTATION, SSL_REDIRECT_ACTION),
        ]
    }
}

/// Path rules for the single ingress rule.
///
/// With HTTPS the redirect rule is the head of the list so the ALB evaluates
/// it before the default backend.
pub struct IngressPaths;

impl IngressPaths {
    fn rule(service: ConfigNode) -> ConfigNode {
        json!({
            "path": "/*",
            "pathType": "Prefix",
            "backend": {"service": service}
        })
    }

    fn redirect_rule() -> ConfigNode {
        Self::rule(json!({
            "name": REDIRECT_SERVICE,
            "port": {"name": "use-annotation"}
        }))
    }
}

impl Derivation for IngressPaths {
    fn name(&self) -> &'static str {
        "ingress-paths"
    }

    fn derive(&self, filled: &ConfigNode) -> Vec<DerivedEntry> {
        let mut paths = Vec::new();
        if https_enabled(filled) {
            paths.push(Self::redirect_rule());
        }

        let backend = get(filled, &TreePath::new(["ingressServiceBackend"]))
            .filter(|service| is_present(service.get("name")));
        if let Some(service) = backend {
            paths.push(Self::rule(service.clone()));
        }

        if paths.is_empty() {
            return Vec::new();
        }
        vec![DerivedEntry::new(
            self.name(),
            TreePath::new(["paths"]),
            ConfigNode::Array(paths),
        )]
    }
}
