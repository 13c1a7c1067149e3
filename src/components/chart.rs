//! Helm chart releases: tezos-k8s, the AWS load balancer controller and
//! external-dns

use serde_json::json;

use compose_tree::{ConfigNode, TreePath};

use super::Component;
use crate::assemble::{ChartSchema, Requirement};
use crate::defaults::{FieldRule, InternalDefaults};
use crate::derive::{DerivationSet, WaitPolicy};

pub const TEZOS_CHART: &str = "tezos-chart";
pub const ALB_CONTROLLER_CHART: &str = "alb-controller-chart";
pub const EXTERNAL_DNS_CHART: &str = "external-dns-chart";

const SYSTEM_NAMESPACE: &str = "kube-system";

fn chart_defaults(id: &'static str, internal: ConfigNode) -> InternalDefaults {
    InternalDefaults::new(id, internal)
        .owned(TreePath::new(["chart"]))
        .owned(TreePath::new(["fetchOpts"]))
        .rule(FieldRule::CoerceFlag {
            path: TreePath::new(["skipAwait"]),
        })
}

/// Values files for a chart are plain Helm values
fn helm_values() -> TreePath {
    TreePath::new(["values"])
}

fn system_namespace() -> FieldRule {
    FieldRule::FillIfAbsent {
        path: TreePath::new(["namespace"]),
        value: json!(SYSTEM_NAMESPACE),
    }
}

fn copy_into_values(field: &str) -> FieldRule {
    FieldRule::CopyIfAbsent {
        path: TreePath::new(["values", field]),
        from: TreePath::new([field]),
    }
}

/// tezos-k8s `tezos-chain` chart. The namespace defaults to the release
/// name; `localChartPath` switches to a chart on disk.
pub fn tezos_chart() -> Component {
    let internal = json!({
        "chart": "tezos-chain",
        "version": "5.2.0",
        "fetchOpts": {"repo": "https://oxheadalpha.github.io/tezos-helm-charts/"}
    });

    Component::new(
        TEZOS_CHART,
        "tezos-k8s Helm chart release",
        chart_defaults(TEZOS_CHART, internal).rule(FieldRule::FillWithRelease {
            path: TreePath::new(["namespace"]),
        }),
        DerivationSet::new().with(WaitPolicy::flag_only()),
        ChartSchema::new(),
    )
    .values_files_under(helm_values())
}

/// aws-load-balancer-controller chart. `clusterName` is copied into the
/// chart values.
pub fn alb_controller_chart() -> Component {
    let internal = json!({
        "chart": "aws-load-balancer-controller",
        "fetchOpts": {"repo": "https://aws.github.io/eks-charts"},
        "namespace": SYSTEM_NAMESPACE,
        "values": {"replicaCount": 2}
    });

    let defaults = chart_defaults(ALB_CONTROLLER_CHART, internal)
        .rule(system_namespace())
        .rule(copy_into_values("clusterName"));

    Component::new(
        ALB_CONTROLLER_CHART,
        "AWS load balancer controller Helm chart release",
        defaults,
        DerivationSet::new().with(WaitPolicy::flag_only()),
        ChartSchema::new()
            .accept("clusterName")
            .require(TreePath::new(["values", "clusterName"]), Requirement::Present),
    )
    .values_files_under(helm_values())
}

/// external-dns chart. `txtOwnerId` must be set, explicitly to null if
/// unused; `zoneIdFilters` is shared with the external-dns policy.
pub fn external_dns_chart() -> Component {
    let internal = json!({
        "chart": "external-dns",
        "fetchOpts": {"repo": "https://charts.bitnami.com/bitnami"},
        "namespace": SYSTEM_NAMESPACE,
        "values": {
            "replicas": 2,
            "policy": "sync",
            "aws": {"zoneType": "public"}
        }
    });

    let defaults = chart_defaults(EXTERNAL_DNS_CHART, internal)
        .rule(system_namespace())
        .rule(copy_into_values("txtOwnerId"))
        .rule(copy_into_values("zoneIdFilters"));

    Component::new(
        EXTERNAL_DNS_CHART,
        "external-dns Helm chart release",
        defaults,
        DerivationSet::new().with(WaitPolicy::flag_only()),
        ChartSchema::new()
            .accept("txtOwnerId")
            .accept("zoneIdFilters")
            .require(TreePath::new(["values", "txtOwnerId"]), Requirement::KeyExists),
    )
    .values_files_under(helm_values())
}
