use serde_json::json;

use compose_tree::TreePath;

use super::ingress::DEFAULT_SCHEME;
use super::Component;
use crate::assemble::ServiceSchema;
use crate::defaults::{FieldRule, InternalDefaults};
use crate::derive::{DerivationSet, LoadBalancerScheme, NlbAnnotations, WaitPolicy};

pub const P2P_SERVICE: &str = "p2p-service";

const P2P_PORT: u16 = 9732;

/// NLB service exposing the node P2P port. The user must supply
/// `spec.selector`.
pub fn p2p_service() -> Component {
    let internal = json!({
        "spec": {
            "ports": [{"port": P2P_PORT, "targetPort": P2P_PORT, "protocol": "TCP"}],
            "type": "LoadBalancer"
        }
    });

    let defaults = InternalDefaults::new(P2P_SERVICE, internal)
        .rule(FieldRule::FillIfAbsent {
            path: TreePath::new(["loadBalancerScheme"]),
            value: json!(DEFAULT_SCHEME),
        })
        .rule(FieldRule::CoerceFlag {
            path: TreePath::new(["skipAwait"]),
        });

    let derivations = DerivationSet::new()
        .with(NlbAnnotations)
        .with(LoadBalancerScheme::nlb())
        .with(WaitPolicy::annotated());

    Component::new(
        P2P_SERVICE,
        "NLB service for the Tezos node P2P port",
        defaults,
        derivations,
        ServiceSchema,
    )
}
