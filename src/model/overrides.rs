//! Typed `meta.superset` override bags.
//!
//! dbt lets authors attach a `superset` block to model, metric and column
//! `meta`. Each known key maps to an optional field here; a `Some` value
//! replaces whatever the sync would otherwise compute for that field.
//! Unknown keys are ignored.

use serde::{Deserialize, Serialize};

/// Dataset fields a model may pin via `meta.superset`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetOverrides {
    pub description: Option<String>,
    pub schema: Option<String>,
    pub cache_timeout: Option<i64>,
    pub default_endpoint: Option<String>,
    pub main_dttm_col: Option<String>,
    pub offset: Option<i64>,
    pub fetch_values_predicate: Option<String>,
    pub filter_select_enabled: Option<bool>,
    pub template_params: Option<String>,
    pub sql: Option<String>,
    pub extra: Option<String>,
    pub is_managed_externally: Option<bool>,
    pub external_url: Option<String>,
    pub owners: Option<Vec<i64>>,
}

impl DatasetOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Metric fields a metric may pin via `meta.superset`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricOverrides {
    pub verbose_name: Option<String>,
    pub description: Option<String>,
    pub d3format: Option<String>,
    pub warning_text: Option<String>,
    pub metric_type: Option<String>,
    pub expression: Option<String>,
    pub extra: Option<String>,
}

/// Column fields a column may pin via `meta.superset`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnOverrides {
    pub is_dttm: Option<bool>,
}
