//! Metric → SQL expression compilation.

use serde::{Deserialize, Serialize};

use super::error::{MetricError, MetricResult};
use super::template;
use crate::model::{CalculationMethod, Metric, MetricFilter, MetricMap};

/// How simple aggregates treat empty input.
///
/// `SUM` over zero rows is `NULL` in SQL. `CoalesceZero` folds that to `0`
/// so derived arithmetic over the metric never goes `NULL`; `Plain` leaves
/// the aggregate untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatePolicy {
    #[default]
    Plain,
    CoalesceZero,
}

impl AggregatePolicy {
    fn wrap(self, aggregate: String) -> String {
        match self {
            Self::Plain => aggregate,
            Self::CoalesceZero => format!("COALESCE({aggregate}, 0)"),
        }
    }
}

/// Compile a metric to a SQL expression using the default [`AggregatePolicy`].
pub fn compile_metric_default(name: &str, metrics: &MetricMap) -> MetricResult<String> {
    compile_metric(name, metrics, AggregatePolicy::default())
}

/// Compile a metric to a SQL expression.
///
/// Derived and expression metrics are resolved recursively against the same
/// `metrics` map.
///
/// # Errors
///
/// - [`MetricError::UnknownMetric`] if `name` (or any metric it references) is missing.
/// - [`MetricError::UnsupportedCalculationMethod`] for unrecognized methods.
/// - [`MetricError::CyclicDependency`] if resolution loops back on itself.
pub fn compile_metric(
    name: &str,
    metrics: &MetricMap,
    policy: AggregatePolicy,
) -> MetricResult<String> {
    MetricCompiler::new(metrics, policy).compile(name)
}

/// Compiler over a fixed set of metrics.
#[derive(Debug, Clone, Copy)]
pub struct MetricCompiler<'a> {
    metrics: &'a MetricMap,
    policy: AggregatePolicy,
}

impl<'a> MetricCompiler<'a> {
    pub fn new(metrics: &'a MetricMap, policy: AggregatePolicy) -> Self {
        Self { metrics, policy }
    }

    pub fn policy(&self) -> AggregatePolicy {
        self.policy
    }

    /// Compile one metric by name.
    pub fn compile(&self, name: &str) -> MetricResult<String> {
        let mut path = Vec::new();
        self.compile_on_path(name, &mut path)
    }

    /// Compile `name`, where `path` holds the derived metrics currently being resolved.
    pub(super) fn compile_on_path(&self, name: &str, path: &mut Vec<String>) -> MetricResult<String> {
        let metric = self
            .metrics
            .get(name)
            .ok_or_else(|| MetricError::UnknownMetric(name.to_string()))?;

        if path.iter().any(|seen| seen == name) {
            let start = path.iter().position(|seen| seen == name).unwrap_or(0);
            let mut cycle = path[start..].to_vec();
            cycle.push(name.to_string());
            return Err(MetricError::CyclicDependency { path: cycle });
        }

        let method = metric
            .method()
            .ok_or_else(|| MetricError::unsupported(metric))?;

        let expression = apply_filters(&metric.expression, &metric.filters);

        let sql = match method {
            CalculationMethod::Count => self.policy.wrap(format!("COUNT({expression})")),
            CalculationMethod::Sum => self.policy.wrap(format!("SUM({expression})")),
            CalculationMethod::Average => self.policy.wrap(format!("AVG({expression})")),
            CalculationMethod::Min => self.policy.wrap(format!("MIN({expression})")),
            CalculationMethod::Max => self.policy.wrap(format!("MAX({expression})")),
            CalculationMethod::CountDistinct => {
                self.policy.wrap(format!("COUNT(DISTINCT {expression})"))
            }
            CalculationMethod::Median => self.policy.wrap(format!(
                "PERCENTILE_CONT(0.5) WITHIN GROUP (ORDER BY {expression} ASC)"
            )),
            CalculationMethod::Derived | CalculationMethod::Expression => {
                path.push(name.to_string());
                let rendered = template::render(self, metric, &expression, path);
                path.pop();
                rendered?
            }
        };

        Ok(sql)
    }

    /// Whether a referenced metric needs parentheses when substituted.
    pub(super) fn is_composite(&self, name: &str) -> bool {
        self.metrics
            .get(name)
            .and_then(Metric::method)
            .is_some_and(|method| method.is_composite())
    }
}

/// Guard an expression with its filters: `CASE WHEN f1 AND f2 THEN expr END`.
pub fn apply_filters(expression: &str, filters: &[MetricFilter]) -> String {
    if filters.is_empty() {
        return expression.to_string();
    }

    let condition = filters
        .iter()
        .map(MetricFilter::to_string)
        .collect::<Vec<_>>()
        .join(" AND ");

    format!("CASE WHEN {condition} THEN {expression} END")
}
