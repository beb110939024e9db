// src/model/metric.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::overrides::MetricOverrides;

/// Metrics keyed by name.
pub type MetricMap = BTreeMap<String, Metric>;

/// A dbt metric definition.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Metric {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Calculation method (dbt >= 1.3).
    #[serde(default)]
    pub calculation_method: Option<String>,
    /// Calculation method under its pre-1.3 name.
    #[serde(default, rename = "type")]
    pub legacy_type: Option<String>,
    /// Column or SQL for simple methods; a template over other metrics for derived ones.
    #[serde(default, alias = "sql")]
    pub expression: String,
    #[serde(default)]
    pub filters: Vec<MetricFilter>,
    /// Groups of metric names this metric is built from.
    #[serde(default)]
    pub metrics: Vec<Vec<String>>,
    /// Unique ids of the models this metric is computed from.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub meta: MetricMeta,
}

/// A single `field operator value` predicate. Filters on a metric are ANDed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetricFilter {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl MetricFilter {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for MetricFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// Free-form metric metadata with the `superset` override bag pulled out.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MetricMeta {
    #[serde(default)]
    pub superset: MetricOverrides,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// The calculation methods the compiler knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationMethod {
    Count,
    Sum,
    Average,
    Min,
    Max,
    CountDistinct,
    Median,
    Derived,
    Expression,
}

impl CalculationMethod {
    /// Parse a manifest method name. Names are matched exactly, so `"SUM"`
    /// and `" sum "` are unrecognized and yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "count" => Some(Self::Count),
            "sum" => Some(Self::Sum),
            "average" => Some(Self::Average),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "count_distinct" => Some(Self::CountDistinct),
            "median" => Some(Self::Median),
            "derived" => Some(Self::Derived),
            "expression" => Some(Self::Expression),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Min => "min",
            Self::Max => "max",
            Self::CountDistinct => "count_distinct",
            Self::Median => "median",
            Self::Derived => "derived",
            Self::Expression => "expression",
        }
    }

    /// Whether the metric's expression is a template over other metrics.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Derived | Self::Expression)
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Metric {
    /// Create a metric with the given method and expression.
    pub fn new(
        name: impl Into<String>,
        calculation_method: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: None,
            description: String::new(),
            calculation_method: Some(calculation_method.into()),
            legacy_type: None,
            expression: expression.into(),
            filters: Vec::new(),
            metrics: Vec::new(),
            depends_on: Vec::new(),
            meta: MetricMeta::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_filter(mut self, filter: MetricFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sub_metrics<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics
            .extend(names.into_iter().map(|name| vec![name.into()]));
        self
    }

    pub fn depending_on(mut self, unique_id: impl Into<String>) -> Self {
        self.depends_on.push(unique_id.into());
        self
    }

    /// The raw method name, accepting the pre-1.3 `type` field as a synonym.
    pub fn method_name(&self) -> Option<&str> {
        self.calculation_method
            .as_deref()
            .or(self.legacy_type.as_deref())
    }

    /// The parsed calculation method, if recognized.
    pub fn method(&self) -> Option<CalculationMethod> {
        self.method_name().and_then(CalculationMethod::parse)
    }

    /// Names of the metrics this one is composed from, in declaration order.
    pub fn sub_metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().flatten().map(String::as_str)
    }

    /// Human-readable name, defaulting to the metric name.
    pub fn verbose_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}
