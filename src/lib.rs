//! tezos-compose - layered composition of Tezos infrastructure documents
//!
//! Builds Kubernetes ingress and service arguments, IAM policy documents and
//! Helm chart releases from ordered values sources. Each component merges the
//! user sources, fills them from its internal defaults, derives annotations
//! and policy statements, then assembles a schema-checked document for the
//! provisioning tool. Provisioning itself happens elsewhere.

pub mod assemble;
pub mod components;
pub mod composition;
pub mod defaults;
pub mod derive;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod source;

pub use assemble::{assemble, AssembledOutput, OutputSchema};
pub use components::{catalog, lookup, Component, COMPONENT_IDS};
pub use composition::{compose, Composition};
pub use defaults::{resolve, FieldPolicy, FieldRule, InternalDefaults, OwnedFieldPolicy};
pub use derive::{Derivation, DerivationSet, DerivedEntries, DerivedEntry};
pub use error::ComposeError;
pub use manifest::{CompositionEntry, LogFormat, LoggingConfig, Manifest, ManifestError};
pub use output::OutputFormat;
pub use source::{MergeSource, SourceOrigin, SourceRecord, SourceStack};

pub use compose_tree::{merge, ConfigNode, TreePath};
