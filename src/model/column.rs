// src/model/column.rs
use serde::{Deserialize, Serialize};

use super::overrides::ColumnOverrides;

/// A documented model column.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Declared warehouse type; dbt leaves this empty unless documented.
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub meta: ColumnMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ColumnMeta {
    #[serde(default)]
    pub superset: ColumnOverrides,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            data_type: None,
            meta: ColumnMeta::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_is_dttm(mut self, is_dttm: bool) -> Self {
        self.meta.superset.is_dttm = Some(is_dttm);
        self
    }

    /// Whether the declared type is a timestamp type.
    ///
    /// Matches `timestamp`, its zoned variants (`timestamp_tz`,
    /// `timestamp with time zone`, ...) and `datetime`. Plain `date` is not a
    /// temporal column for Superset's purposes.
    pub fn has_timestamp_type(&self) -> bool {
        self.data_type.as_deref().is_some_and(|dt| {
            let dt = dt.trim().to_ascii_lowercase();
            dt.starts_with("timestamp") || dt.starts_with("datetime")
        })
    }

    /// Whether Superset should treat the column as temporal.
    ///
    /// Timestamp-typed columns are temporal unless `meta.superset.is_dttm`
    /// turns the flag off. The override cannot turn it on.
    pub fn is_dttm(&self) -> bool {
        self.has_timestamp_type() && self.meta.superset.is_dttm != Some(false)
    }
}
