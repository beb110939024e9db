//! Superset dataset API types.
//!
//! Field names follow the `/api/v1/dataset/` payloads so these types
//! serialize straight onto the wire.

use serde::{Deserialize, Serialize};

use crate::model::DatasetOverrides;

/// A dataset as returned by list and create calls.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatasetSummary {
    pub id: i64,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub schema: Option<String>,
    /// JSON blob; datasets created by the sync carry a [`DatasetExtra`].
    #[serde(default)]
    pub extra: Option<String>,
}

impl DatasetSummary {
    /// The dbt unique id stored in `extra`, if the blob parses and has one.
    pub fn unique_id(&self) -> Option<String> {
        let extra: serde_json::Value = serde_json::from_str(self.extra.as_deref()?).ok()?;
        extra.get("unique_id")?.as_str().map(str::to_string)
    }
}

/// Full dataset detail, as returned by `GET /api/v1/dataset/<id>`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatasetDetail {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub metrics: Vec<RemoteMetric>,
    #[serde(default)]
    pub columns: Vec<RemoteColumn>,
}

/// A dataset metric, restricted to the fields the sync reads and writes.
///
/// Server-managed fields (ids, timestamps, ownership) are dropped on
/// deserialization so preserved metrics can be written back as-is.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteMetric {
    pub metric_name: String,
    #[serde(default)]
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d3format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl RemoteMetric {
    pub fn new(metric_name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            expression: expression.into(),
            metric_type: None,
            verbose_name: None,
            description: None,
            d3format: None,
            warning_text: None,
            extra: None,
        }
    }
}

/// A dataset column as returned by the detail call.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteColumn {
    pub column_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_dttm: bool,
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
}

/// Column fields pushed by the sync.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnUpdate {
    pub column_name: String,
    pub description: String,
    pub is_dttm: bool,
}

/// Body of `POST /api/v1/dataset/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewDataset {
    /// Superset database id.
    pub database: i64,
    pub schema: String,
    pub table_name: String,
    /// Query body; set for virtual datasets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

impl NewDataset {
    pub fn is_virtual(&self) -> bool {
        self.sql.is_some()
    }
}

/// Body of `PUT /api/v1/dataset/<id>`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_managed_externally: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_dttm_col: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_values_predicate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_select_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_params: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owners: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<RemoteMetric>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnUpdate>>,
}

impl DatasetUpdate {
    /// An update that only replaces the metric list.
    pub fn metrics(metrics: Vec<RemoteMetric>) -> Self {
        Self {
            metrics: Some(metrics),
            ..Self::default()
        }
    }

    /// An update that only replaces the column list.
    pub fn columns(columns: Vec<ColumnUpdate>) -> Self {
        Self {
            columns: Some(columns),
            ..Self::default()
        }
    }

    /// Apply a model's `meta.superset` overrides. Set override fields win.
    pub fn with_overrides(mut self, overrides: &DatasetOverrides) -> Self {
        fn pick<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                field.clone_from(value);
            }
        }

        pick(&mut self.description, &overrides.description);
        pick(&mut self.schema, &overrides.schema);
        pick(&mut self.extra, &overrides.extra);
        pick(&mut self.is_managed_externally, &overrides.is_managed_externally);
        pick(&mut self.external_url, &overrides.external_url);
        pick(&mut self.cache_timeout, &overrides.cache_timeout);
        pick(&mut self.default_endpoint, &overrides.default_endpoint);
        pick(&mut self.main_dttm_col, &overrides.main_dttm_col);
        pick(&mut self.offset, &overrides.offset);
        pick(&mut self.fetch_values_predicate, &overrides.fetch_values_predicate);
        pick(&mut self.filter_select_enabled, &overrides.filter_select_enabled);
        pick(&mut self.template_params, &overrides.template_params);
        pick(&mut self.sql, &overrides.sql);
        pick(&mut self.owners, &overrides.owners);
        self
    }
}

/// The `extra` blob the sync stores on every dataset it manages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatasetExtra {
    pub unique_id: String,
    pub depends_on: String,
    pub certification: Certification,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Certification {
    pub details: String,
}

impl Default for Certification {
    fn default() -> Self {
        Self {
            details: "This table is produced by dbt".to_string(),
        }
    }
}
