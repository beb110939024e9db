//! Metric compilation error types.

use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for metric compilation.
pub type MetricResult<T> = Result<T, MetricError>;

/// Errors that can occur while compiling or walking metrics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// A metric name was referenced but not defined.
    #[error("invalid metric {0}")]
    UnknownMetric(String),

    /// The metric's calculation method has no SQL rendering.
    #[error("unable to generate metric expression from: {record}")]
    UnsupportedCalculationMethod {
        /// Name of the offending metric.
        name: String,
        /// The method as written in the manifest, if any.
        method: Option<String>,
        /// The full metric record as JSON with sorted keys.
        record: String,
    },

    /// Metrics reference each other in a loop.
    #[error("cyclic metric dependency: {}", path.join(" -> "))]
    CyclicDependency {
        /// Metric names along the cycle, first name repeated at the end.
        path: Vec<String>,
    },
}

impl MetricError {
    /// Build an unsupported-method error carrying the full metric record.
    pub fn unsupported(metric: &crate::model::Metric) -> Self {
        let record = serde_json::to_value(metric)
            .and_then(serde_json::from_value::<BTreeMap<String, serde_json::Value>>)
            .and_then(|sorted| serde_json::to_string(&sorted))
            .unwrap_or_else(|_| format!("{metric:?}"));

        Self::UnsupportedCalculationMethod {
            name: metric.name.clone(),
            method: metric.method_name().map(str::to_string),
            record,
        }
    }

    /// The metric name the error is about, when there is a single one.
    pub fn metric_name(&self) -> Option<&str> {
        match self {
            Self::UnknownMetric(name) => Some(name),
            Self::UnsupportedCalculationMethod { name, .. } => Some(name),
            Self::CyclicDependency { .. } => None,
        }
    }
}
