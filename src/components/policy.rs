use serde_json::json;

use compose_tree::TreePath;

use super::alb_policy::alb_controller_statements;
use super::Component;
use crate::assemble::PolicySchema;
use crate::defaults::InternalDefaults;
use crate::derive::{DerivationSet, HostedZoneStatements};

pub const EXTERNAL_DNS_POLICY: &str = "external-dns-policy";
pub const ALB_CONTROLLER_POLICY: &str = "alb-controller-policy";

const POLICY_VERSION: &str = "2012-10-17";

/// Route53 access for external-dns, scoped by `zoneIdFilters`
pub fn external_dns_policy() -> Component {
    let defaults = InternalDefaults::new(EXTERNAL_DNS_POLICY, json!({"Version": POLICY_VERSION}))
        .owned(TreePath::new(["Version"]));

    Component::new(
        EXTERNAL_DNS_POLICY,
        "IAM policy letting external-dns manage Route53 records",
        defaults,
        DerivationSet::new().with(HostedZoneStatements),
        PolicySchema,
    )
}

/// The load balancer controller's fixed permission set
pub fn alb_controller_policy() -> Component {
    let internal = json!({
        "Version": POLICY_VERSION,
        "Statement": alb_controller_statements()
    });
    let defaults = InternalDefaults::new(ALB_CONTROLLER_POLICY, internal)
        .owned(TreePath::new(["Version"]))
        .owned(TreePath::new(["Statement"]));

    Component::new(
        ALB_CONTROLLER_POLICY,
        "IAM policy for the AWS load balancer controller",
        defaults,
        DerivationSet::new(),
        PolicySchema,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alb_statements_owned() {
        let policy = alb_controller_policy();
        let filled = policy.resolve(&json!({"Statement": [], "Version": "2008-10-17"}));
        assert_eq!(filled["Version"], POLICY_VERSION);
        assert_eq!(filled["Statement"], alb_controller_statements());
    }

    #[test]
    fn test_external_dns_statements_derived() {
        let policy = external_dns_policy();
        let derived = policy.derive(&policy.resolve(&json!({"zoneIdFilters": ["Z1"]})));
        let statements = derived.get(&TreePath::new(["Statement"])).unwrap();
        assert_eq!(
            statements[0]["Resource"],
            json!(["arn:aws:route53:::hostedzone/Z1"])
        );
    }
}
