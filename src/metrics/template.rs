//! Substitution of metric references inside derived metric templates.
//!
//! Two reference forms are recognized:
//!
//! - placeholders: `{{ metric('revenue') }}` (single or double quotes)
//! - bare names: `revenue - cost`, matched on word boundaries
//!
//! Bare names are only looked for among the metric's declared sub-metrics.
//! A metric that declares none is rendered from its placeholders alone, so
//! plain SQL comes out unchanged. All references are replaced in one pass,
//! so SQL substituted for one name is never rescanned for another.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use super::compiler::MetricCompiler;
use super::error::{MetricError, MetricResult};
use crate::model::Metric;

const PLACEHOLDER: &str = r#"\{\{\s*metric\(\s*['"]([^'"]+)['"]\s*\)\s*\}\}"#;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(PLACEHOLDER).expect("placeholder pattern is valid"));

pub(super) fn render(
    compiler: &MetricCompiler<'_>,
    metric: &Metric,
    template: &str,
    path: &mut Vec<String>,
) -> MetricResult<String> {
    let names = literal_candidates(metric);
    let pattern = reference_pattern(&names)?;

    // Resolve everything first so errors surface before any substitution.
    let mut resolved: HashMap<String, String> = HashMap::new();
    for caps in pattern.captures_iter(template) {
        let name = referenced_name(&caps);
        if resolved.contains_key(name) {
            continue;
        }
        let sql = compiler.compile_on_path(name, path)?;
        let sql = if compiler.is_composite(name) {
            format!("({sql})")
        } else {
            sql
        };
        resolved.insert(name.to_string(), sql);
    }

    let rendered = pattern.replace_all(template, |caps: &Captures<'_>| {
        let name = referenced_name(caps);
        resolved
            .get(name)
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });

    Ok(rendered.into_owned())
}

fn referenced_name<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map_or("", |m| m.as_str())
}

fn literal_candidates(metric: &Metric) -> Vec<&str> {
    let mut names: Vec<&str> = metric.sub_metric_names().collect();
    names.retain(|name| *name != metric.name && !name.is_empty());
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    names.dedup();
    names
}

fn reference_pattern(names: &[&str]) -> MetricResult<Regex> {
    if names.is_empty() {
        return Ok(PLACEHOLDER_RE.clone());
    }

    let alternatives = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");

    let pattern = format!(r"{PLACEHOLDER}|\b({alternatives})\b");
    Regex::new(&pattern).map_err(|_| MetricError::UnknownMetric(names.join(", ")))
}
