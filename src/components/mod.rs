//! Component catalog
//!
//! A component bundles the internal defaults, the derivations and the output
//! schema for one kind of resource. Components hold no mutable state and can
//! be shared between threads.

mod alb_policy;
mod chart;
mod ingress;
mod policy;
mod service;

use std::fmt;

use compose_tree::{ConfigNode, TreePath};

use crate::assemble::OutputSchema;
use crate::defaults::{FieldRule, InternalDefaults};
use crate::derive::{DerivationSet, DerivedEntries};

/// Identifiers of every component in the catalog
pub const COMPONENT_IDS: &[&str] = &[
    ingress::RPC_INGRESS,
    ingress::TZKT_INGRESS,
    service::P2P_SERVICE,
    chart::TEZOS_CHART,
    chart::ALB_CONTROLLER_CHART,
    chart::EXTERNAL_DNS_CHART,
    policy::EXTERNAL_DNS_POLICY,
    policy::ALB_CONTROLLER_POLICY,
];

pub struct Component {
    id: &'static str,
    summary: &'static str,
    defaults: InternalDefaults,
    derivations: DerivationSet,
    schema: Box<dyn OutputSchema>,
    values_file_root: Option<TreePath>,
}

impl Component {
    pub(crate) fn new(
        id: &'static str,
        summary: &'static str,
        defaults: InternalDefaults,
        derivations: DerivationSet,
        schema: impl OutputSchema + 'static,
    ) -> Self {
        Self {
            id,
            summary,
            defaults,
            derivations,
            schema: Box::new(schema),
            values_file_root: None,
        }
    }

    /// Place values-file sources under `root` instead of at the top level.
    pub(crate) fn values_files_under(mut self, root: TreePath) -> Self {
        self.values_file_root = Some(root);
        self
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn summary(&self) -> &'static str {
        self.summary
    }

    pub fn defaults(&self) -> &InternalDefaults {
        &self.defaults
    }

    pub fn schema(&self) -> &dyn OutputSchema {
        self.schema.as_ref()
    }

    /// Where values files land in the component tree (`None` = root)
    pub fn values_file_root(&self) -> Option<&TreePath> {
        self.values_file_root.as_ref()
    }

    pub fn derivation_names(&self) -> Vec<&'static str> {
        self.derivations.names()
    }

    /// Paths the component dictates regardless of user input
    pub fn owned_paths(&self) -> Vec<TreePath> {
        self.defaults.policy.owned_paths().cloned().collect()
    }

    /// Paths computed by derivations; user values there are dropped
    pub fn reserved_paths(&self) -> Vec<TreePath> {
        self.defaults
            .rules
            .iter()
            .filter_map(|rule| match rule {
                FieldRule::Reserved { path } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn resolve(&self, user: &ConfigNode) -> ConfigNode {
        self.defaults.resolve(user)
    }

    /// Resolve for a named release (Helm namespace defaults use it)
    pub fn resolve_release(&self, release: &str, user: &ConfigNode) -> ConfigNode {
        self.defaults.resolve_release(release, user)
    }

    pub fn derive(&self, filled: &ConfigNode) -> DerivedEntries {
        self.derivations.derive(filled)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("schema", &self.schema.name())
            .field("derivations", &self.derivations)
            .finish()
    }
}

/// Look up a component by identifier.
pub fn lookup(id: &str) -> Option<Component> {
    let component = match id {
        ingress::RPC_INGRESS => ingress::rpc_ingress(),
        ingress::TZKT_INGRESS => ingress::tzkt_ingress(),
        service::P2P_SERVICE => service::p2p_service(),
        chart::TEZOS_CHART => chart::tezos_chart(),
        chart::ALB_CONTROLLER_CHART => chart::alb_controller_chart(),
        chart::EXTERNAL_DNS_CHART => chart::external_dns_chart(),
        policy::EXTERNAL_DNS_POLICY => policy::external_dns_policy(),
        policy::ALB_CONTROLLER_POLICY => policy::alb_controller_policy(),
        _ => return None,
    };
    Some(component)
}

/// Every component, in catalog order
pub fn catalog() -> Vec<Component> {
    COMPONENT_IDS.iter().filter_map(|id| lookup(id)).collect()
}
