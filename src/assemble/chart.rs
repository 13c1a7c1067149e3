//! Helm chart release arguments
//!
//! Either a remote chart (`chart`, `version`, `fetchOpts.repo`) or, when
//! `localChartPath` is set, a chart on disk (`path`). Both forms carry the
//! release namespace, the chart values and the wait flag. Any other
//! top-level key is rejected, since it would otherwise vanish from the
//! release.

use serde_json::json;

use compose_tree::{get, is_present, kind_name, ConfigMap, ConfigNode, TreePath};

use super::{mapping_or_empty, OutputSchema};

/// Top-level keys every chart release understands
const CHART_KEYS: &[&str] = &[
    "chart",
    "version",
    "fetchOpts",
    "localChartPath",
    "namespace",
    "values",
    "skipAwait",
];

/// How strictly a chart value is required
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Must hold a present value
    Present,
    /// The key must exist; null is accepted
    KeyExists,
}

#[derive(Debug, Clone, Default)]
pub struct ChartSchema {
    required: Vec<(TreePath, Requirement)>,
    accepted: Vec<&'static str>,
}

impl ChartSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, path: TreePath, requirement: Requirement) -> Self {
        self.required.push((path, requirement));
        self
    }

    /// Accept an extra top-level input key (one the component copies into
    /// the chart values).
    pub fn accept(mut self, key: &'static str) -> Self {
        self.accepted.push(key);
        self
    }

    fn check_keys(&self, tree: &ConfigNode) -> Result<(), String> {
        let Some(map) = tree.as_object() else {
            return Err(format!("expected a mapping, found {}", kind_name(tree)));
        };
        let unknown = map
            .keys()
            .find(|key| !CHART_KEYS.contains(&key.as_str()) && !self.accepted.contains(&key.as_str()));
        match unknown {
            Some(key) => Err(format!(
                "unknown key '{}'; chart values belong under 'values'",
                key
            )),
            None => Ok(()),
        }
    }

    fn required_string(tree: &ConfigNode, key: &str) -> Result<ConfigNode, String> {
        match tree.get(key) {
            Some(ConfigNode::String(s)) if !s.is_empty() => Ok(ConfigNode::String(s.clone())),
            None | Some(ConfigNode::Null) => Err(format!("'{}' is required", key)),
            Some(ConfigNode::String(_)) => Err(format!("'{}' must not be empty", key)),
            Some(other) => Err(format!("'{}' must be a string, found {}", key, kind_name(other))),
        }
    }

    fn source(tree: &ConfigNode) -> Result<ConfigMap, String> {
        let mut source = ConfigMap::new();
        if is_present(tree.get("localChartPath")) {
            source.insert("path".to_string(), Self::required_string(tree, "localChartPath")?);
            return Ok(source);
        }

        source.insert("chart".to_string(), Self::required_string(tree, "chart")?);
        if let Some(version) = tree.get("version").filter(|v| is_present(Some(*v))) {
            source.insert("version".to_string(), version.clone());
        }
        let fetch_opts = mapping_or_empty(tree, "fetchOpts")?;
        Self::required_string(&fetch_opts, "repo").map_err(|e| format!("fetchOpts: {}", e))?;
        source.insert("fetchOpts".to_string(), fetch_opts);
        Ok(source)
    }
}

impl OutputSchema for ChartSchema {
    fn name(&self) -> &'static str {
        "helm-chart"
    }

    fn shape(&self, tree: &ConfigNode) -> Result<ConfigNode, String> {
        self.check_keys(tree)?;
        let mut document = Self::source(tree)?;

        document.insert("namespace".to_string(), Self::required_string(tree, "namespace")?);

        let values = mapping_or_empty(tree, "values")?;
        for (path, requirement) in &self.required {
            let found = get(tree, path);
            let satisfied = match requirement {
                Requirement::Present => is_present(found),
                Requirement::KeyExists => found.is_some(),
            };
            if !satisfied {
                return Err(format!("{} is required", path));
            }
        }
        document.insert("values".to_string(), values);

        let skip_await = match tree.get("skipAwait") {
            Some(ConfigNode::Bool(flag)) => *flag,
            _ => return Err("skipAwait must be a boolean".to_string()),
        };
        document.insert("skipAwait".to_string(), json!(skip_await));

        Ok(ConfigNode::Object(document))
    }
}
