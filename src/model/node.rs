// src/model/node.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::column::Column;
use super::overrides::DatasetOverrides;

/// A dbt model: a table or view that becomes one Superset dataset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Model {
    /// Stable identifier (`model.<project>.<name>`), used to re-match datasets across runs.
    pub unique_id: String,
    pub name: String,
    /// Physical relation name, when it differs from the model name.
    #[serde(default)]
    pub alias: Option<String>,
    pub database: String,
    pub schema: String,
    #[serde(default)]
    pub description: String,
    /// Columns keyed by column name.
    #[serde(default)]
    pub columns: BTreeMap<String, Column>,
    #[serde(default)]
    pub meta: ModelMeta,
}

/// Free-form model metadata with the `superset` override bag pulled out.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ModelMeta {
    #[serde(default)]
    pub superset: DatasetOverrides,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl Model {
    /// Create a model with no columns, description or metadata.
    pub fn new(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        database: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            alias: None,
            database: database.into(),
            schema: schema.into(),
            description: String::new(),
            columns: BTreeMap::new(),
            meta: ModelMeta::default(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.insert(column.name.clone(), column);
        self
    }

    pub fn with_overrides(mut self, overrides: DatasetOverrides) -> Self {
        self.meta.superset = overrides;
        self
    }

    /// The relation name the dataset is registered under: alias if set, else name.
    pub fn table_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Lineage reference stored in the dataset `extra` blob.
    pub fn lineage_ref(&self) -> String {
        format!("ref('{}')", self.name)
    }
}
