//! dbt `manifest.json` adapter.
//!
//! Reads the models and metrics out of a compiled dbt manifest and hands
//! them to the rest of the crate as [`Model`] and [`Metric`] records. Only the
//! fields the sync uses are read; everything else in the manifest is ignored.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{Metric, MetricMap, Model};

/// Error type for manifest loading.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Manifest not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read manifest: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid {kind} '{unique_id}': {source}")]
    InvalidNode {
        kind: &'static str,
        unique_id: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type ManifestResult<T> = Result<T, ManifestError>;

/// A parsed dbt manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    nodes: BTreeMap<String, Value>,
    #[serde(default)]
    metrics: BTreeMap<String, Value>,
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ManifestResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ManifestError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a manifest from its JSON text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> ManifestResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Model nodes, in unique id order.
    pub fn models(&self) -> ManifestResult<Vec<Model>> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.get("resource_type").and_then(Value::as_str) == Some("model"))
            .map(|(unique_id, node)| {
                let mut node = node.clone();
                if let Some(fields) = node.as_object_mut() {
                    normalize_model(unique_id, fields);
                }
                serde_json::from_value(node).map_err(|source| ManifestError::InvalidNode {
                    kind: "model",
                    unique_id: unique_id.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Metrics keyed by metric name.
    pub fn metrics(&self) -> ManifestResult<MetricMap> {
        let mut metrics = MetricMap::new();
        for (unique_id, node) in &self.metrics {
            let mut node = node.clone();
            if let Some(fields) = node.as_object_mut() {
                normalize_metric(fields);
            }
            let metric: Metric =
                serde_json::from_value(node).map_err(|source| ManifestError::InvalidNode {
                    kind: "metric",
                    unique_id: unique_id.clone(),
                    source,
                })?;
            metrics.insert(metric.name.clone(), metric);
        }
        Ok(metrics)
    }
}

/// Fill fields some adapters leave null and pick up `config.meta`.
fn normalize_model(unique_id: &str, fields: &mut Map<String, Value>) {
    fields
        .entry("unique_id")
        .or_insert_with(|| Value::String(unique_id.to_string()));

    for key in ["database", "schema", "description"] {
        let entry = fields.entry(key).or_insert(Value::Null);
        if entry.is_null() {
            *entry = Value::String(String::new());
        }
    }

    // dbt copies `meta` into `config.meta`; older manifests only have one of them.
    let config_meta = fields
        .get("config")
        .and_then(|config| config.get("meta"))
        .and_then(Value::as_object)
        .cloned();
    if let Some(mut merged) = config_meta {
        if let Some(Value::Object(meta)) = fields.remove("meta") {
            merged.extend(meta);
        }
        fields.insert("meta".to_string(), Value::Object(merged));
    }

    if let Some(Value::Object(columns)) = fields.get_mut("columns") {
        for column in columns.values_mut() {
            if let Some(column) = column.as_object_mut() {
                if column.get("description").is_some_and(Value::is_null) {
                    column.insert("description".to_string(), Value::String(String::new()));
                }
            }
        }
    }
}

/// Flatten `depends_on.nodes` and drop the legacy `sql` key when `expression` is set.
fn normalize_metric(fields: &mut Map<String, Value>) {
    if let Some(depends_on) = fields.get_mut("depends_on") {
        if depends_on.is_object() {
            let nodes = depends_on
                .get("nodes")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()));
            *depends_on = nodes;
        }
    }

    if fields.contains_key("expression") {
        fields.remove("sql");
    }

    if fields.get("description").is_some_and(Value::is_null) {
        fields.insert("description".to_string(), Value::String(String::new()));
    }
}
