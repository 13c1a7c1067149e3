//! ALB ingresses for the node RPC endpoint and the TzKT indexer API

use serde_json::json;

use compose_tree::TreePath;

use super::Component;
use crate::assemble::IngressSchema;
use crate::defaults::{FieldRule, InternalDefaults};
use crate::derive::{
    DerivationSet, Healthcheck, IngressClass, IngressPaths, ListenerPorts, LoadBalancerScheme,
    SslRedirect, WaitPolicy,
};

pub const RPC_INGRESS: &str = "rpc-ingress";
pub const TZKT_INGRESS: &str = "tzkt-ingress";

pub(crate) const DEFAULT_SCHEME: &str = "internet-facing";

fn alb_ingress(
    id: &'static str,
    summary: &'static str,
    service: &str,
    port: u16,
    healthcheck_path: &str,
) -> Component {
    let internal = json!({
        "ingressServiceBackend": {
            "name": service,
            "port": {"number": port}
        },
        "healthcheckPath": healthcheck_path,
        "healthcheckPort": port.to_string()
    });

    let defaults = InternalDefaults::new(id, internal)
        .owned(TreePath::new(["ingressServiceBackend"]))
        .owned(TreePath::new(["healthcheckPath"]))
        .owned(TreePath::new(["healthcheckPort"]))
        .rule(FieldRule::FillIfAbsent {
            path: TreePath::new(["loadBalancerScheme"]),
            value: json!(DEFAULT_SCHEME),
        })
        .rule(FieldRule::CoerceFlag {
            path: TreePath::new(["skipAwait"]),
        })
        .rule(FieldRule::Reserved {
            path: TreePath::new(["paths"]),
        });

    let derivations = DerivationSet::new()
        .with(IngressClass)
        .with(LoadBalancerScheme::alb())
        .with(Healthcheck)
        .with(ListenerPorts)
        .with(SslRedirect)
        .with(IngressPaths)
        .with(WaitPolicy::annotated());

    Component::new(id, summary, defaults, derivations, IngressSchema)
}

pub fn rpc_ingress() -> Component {
    alb_ingress(
        RPC_INGRESS,
        "ALB ingress for the Tezos node RPC endpoint",
        "tezos-node-rpc",
        8732,
        "/chains/main/blocks/head/header",
    )
}

pub fn tzkt_ingress() -> Component {
    alb_ingress(
        TZKT_INGRESS,
        "ALB ingress for the TzKT indexer API",
        "tzkt-indexer",
        5000,
        "/v1/blocks/count",
    )
}
