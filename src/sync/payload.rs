//! Build the update payloads pushed for one model.

use std::collections::BTreeSet;

use url::Url;

use super::SyncOptions;
use crate::metrics::{MetricCompiler, MetricResult};
use crate::model::{Metric, MetricOverrides, Model};
use crate::superset::{Certification, ColumnUpdate, DatasetExtra, DatasetUpdate, RemoteMetric};

/// Superset's implicit row-count metric. Never carried over from the remote list.
pub const COUNT_METRIC: &str = "count";

/// Base fields for a model's dataset.
///
/// Clears the metric list; metrics are written in a separate update so the
/// base update cannot double-write them. Model overrides are applied last.
pub fn base_update(model: &Model, options: &SyncOptions) -> DatasetUpdate {
    let extra = DatasetExtra {
        unique_id: model.unique_id.clone(),
        depends_on: model.lineage_ref(),
        certification: Certification::default(),
    };

    DatasetUpdate {
        description: Some(model.description.clone()),
        schema: Some(model.schema.clone()),
        extra: serde_json::to_string(&extra).ok(),
        is_managed_externally: Some(options.disallow_edits),
        external_url: options.external_url(model).map(String::from),
        metrics: Some(Vec::new()),
        ..DatasetUpdate::default()
    }
    .with_overrides(&model.meta.superset)
}

/// Deep link to the model's documentation page under `prefix`.
pub fn model_url(prefix: &Url, unique_id: &str) -> Url {
    let mut url = prefix.clone();
    url.set_fragment(Some(&format!("!/model/{unique_id}")));
    url
}

/// Merge the dataset's current metrics with the compiled manifest metrics.
///
/// Remote metrics survive unless they are named `count` or share a name with
/// any manifest metric, in which case the manifest version wins.
pub fn merge_metrics(
    existing: Vec<RemoteMetric>,
    compiled: Vec<RemoteMetric>,
    manifest_names: &BTreeSet<&str>,
) -> Vec<RemoteMetric> {
    let mut merged: Vec<RemoteMetric> = existing
        .into_iter()
        .filter(|metric| {
            metric.metric_name != COUNT_METRIC
                && !manifest_names.contains(metric.metric_name.as_str())
        })
        .collect();
    merged.extend(compiled);
    merged
}

/// Compile a manifest metric into its Superset form.
pub fn remote_metric(compiler: &MetricCompiler<'_>, metric: &Metric) -> MetricResult<RemoteMetric> {
    let expression = compiler.compile(&metric.name)?;

    let mut remote = RemoteMetric::new(metric.name.clone(), expression);
    remote.verbose_name = Some(metric.verbose_name().to_string());
    remote.description = Some(metric.description.clone());
    remote.metric_type = metric.method_name().map(str::to_string);
    remote.extra = serde_json::to_string(&metric.meta.other).ok();

    Ok(apply_metric_overrides(remote, &metric.meta.superset))
}

fn apply_metric_overrides(mut remote: RemoteMetric, overrides: &MetricOverrides) -> RemoteMetric {
    if let Some(expression) = &overrides.expression {
        remote.expression.clone_from(expression);
    }
    for (field, value) in [
        (&mut remote.verbose_name, &overrides.verbose_name),
        (&mut remote.description, &overrides.description),
        (&mut remote.d3format, &overrides.d3format),
        (&mut remote.warning_text, &overrides.warning_text),
        (&mut remote.metric_type, &overrides.metric_type),
        (&mut remote.extra, &overrides.extra),
    ] {
        if value.is_some() {
            field.clone_from(value);
        }
    }
    remote
}

/// Column updates for every column on the model, in name order.
pub fn column_updates(model: &Model) -> Vec<ColumnUpdate> {
    model
        .columns
        .values()
        .map(|column| ColumnUpdate {
            column_name: column.name.clone(),
            description: column.description.clone(),
            is_dttm: column.is_dttm(),
        })
        .collect()
}
