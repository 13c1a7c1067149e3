//! Composition pipeline
//!
//! merge → resolve → derive → assemble for one component. Every
//! intermediate tree is kept on the [`Composition`] for diagnostics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

use compose_tree::{ConfigNode, TreePath};

use crate::assemble::{assemble, AssembledOutput};
use crate::components::Component;
use crate::derive::{skip_await, DerivedEntries};
use crate::error::ComposeError;
use crate::source::{SourceRecord, SourceStack};

/// Schema version of the serialized composition record
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "tezos-compose/composition@1";

/// A derived entry as recorded on a composition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRecord {
    pub path: String,
    pub value: ConfigNode,
    pub derivation: &'static str,
}

/// Result of composing one component with full provenance
#[derive(Debug, Clone, Serialize)]
pub struct Composition {
    pub schema_version: u32,
    pub schema_id: String,
    pub name: String,
    pub component: String,
    pub created_at: DateTime<Utc>,

    /// Contributing user sources in precedence order
    pub sources: Vec<SourceRecord>,

    /// User sources merged
    pub merged: ConfigNode,

    /// Merged tree after internal defaults
    pub filled: ConfigNode,

    pub derived: Vec<DerivedRecord>,

    pub output: AssembledOutput,
}

impl Composition {
    /// The assembled document handed to the provisioning collaborator
    pub fn document(&self) -> &ConfigNode {
        &self.output.document
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the full composition record
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}

/// Compose `component` from `sources`. `name` labels logs and errors.
pub fn compose(
    name: &str,
    component: &Component,
    sources: &SourceStack,
) -> Result<Composition, ComposeError> {
    let origin = format!("{} ({})", name, component.id());

    let merged = match component.values_file_root() {
        Some(root) => sources.merged_with_files_under(root),
        None => sources.merged(),
    };
    tracing::debug!(composition = name, sources = sources.sources().len(), "merged user sources");

    let filled = component.resolve_release(name, &merged);
    tracing::debug!(composition = name, component = component.id(), "resolved internal defaults");

    let derived = component.derive(&filled);
    tracing::debug!(
        composition = name,
        entries = derived.entries().len(),
        "derived entries"
    );

    let output = assemble(&filled, &derived, component.schema(), &origin)?;
    tracing::debug!(composition = name, digest = %output.digest, "assembled {}", output.schema);

    let waits = derived.get(&TreePath::new(["skipAwait"])).is_some();
    if waits && skip_await(&filled) {
        tracing::info!(
            composition = name,
            "{}: the provisioner will not wait for readiness; set skipAwait to false to wait",
            name
        );
    }

    Ok(Composition {
        schema_version: SCHEMA_VERSION,
        schema_id: SCHEMA_ID.to_string(),
        name: name.to_string(),
        component: component.id().to_string(),
        created_at: Utc::now(),
        sources: sources.records(),
        merged,
        filled,
        derived: records(&derived),
        output,
    })
}

fn records(derived: &DerivedEntries) -> Vec<DerivedRecord> {
    derived
        .entries()
        .iter()
        .map(|e| DerivedRecord {
            path: e.path.to_string(),
            value: e.value.clone(),
            derivation: e.derivation,
        })
        .collect()
}
