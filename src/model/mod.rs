//! Manifest records: models, columns and metrics.
//!
//! These are the desired-state inputs to a sync. They are produced by the
//! manifest adapter (or built directly in tests) and are never mutated by
//! the compiler or the reconciliation engine.

pub mod column;
pub mod metric;
pub mod node;
pub mod overrides;

pub use column::{Column, ColumnMeta};
pub use metric::{CalculationMethod, Metric, MetricFilter, MetricMap, MetricMeta};
pub use node::{Model, ModelMeta};
pub use overrides::{ColumnOverrides, DatasetOverrides, MetricOverrides};
