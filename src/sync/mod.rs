//! Dataset reconciliation.
//!
//! Brings Superset's datasets in line with a manifest, one model at a time:
//!
//! ```text
//! find_datasets ──► (create_dataset) ──► get_dataset
//!                                            │
//!        ┌───────────────────────────────────┘
//!        ▼
//! update base (metrics cleared) ──► update metrics ──► update columns
//! ```
//!
//! Models are processed sequentially. A failing model is logged and skipped;
//! the rest of the batch still runs.

mod error;
mod locate;
mod payload;

use std::collections::BTreeSet;

use tracing::{info, warn};
use url::Url;

pub use error::{SyncError, SyncResult};
pub use locate::new_dataset;
pub use payload::{base_update, column_updates, merge_metrics, model_url, COUNT_METRIC};

use crate::config::DatabaseConnection;
use crate::metrics::{AggregatePolicy, MetricCompiler, MetricGraph, MetricResult};
use crate::model::{MetricMap, Model};
use crate::superset::{DatasetSummary, DatasetUpdate, RemoteMetric, SupersetClient};

/// Knobs for a sync run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOptions {
    /// Mark datasets as managed externally (read-only in Superset).
    pub disallow_edits: bool,
    /// dbt docs base URL for dataset deep links.
    pub external_url_prefix: Option<Url>,
    pub aggregate_policy: AggregatePolicy,
}

impl SyncOptions {
    pub fn with_disallow_edits(mut self, disallow_edits: bool) -> Self {
        self.disallow_edits = disallow_edits;
        self
    }

    pub fn with_aggregate_policy(mut self, policy: AggregatePolicy) -> Self {
        self.aggregate_policy = policy;
        self
    }

    pub fn with_external_url_prefix(mut self, prefix: &str) -> Result<Self, url::ParseError> {
        self.external_url_prefix = Some(Url::parse(prefix)?);
        Ok(self)
    }

    /// The dataset's link back to the model docs, if a prefix is configured.
    pub fn external_url(&self, model: &Model) -> Option<Url> {
        self.external_url_prefix
            .as_ref()
            .map(|prefix| model_url(prefix, &model.unique_id))
    }
}

/// A model that could not be synced.
#[derive(Debug)]
pub struct SyncFailure {
    pub unique_id: String,
    pub error: SyncError,
}

/// Outcome of a batch: reconciled datasets plus the models that were skipped.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub datasets: Vec<DatasetSummary>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reconciles models against one Superset database.
pub struct Reconciler<'a, C: SupersetClient + ?Sized> {
    client: &'a C,
    metrics: &'a MetricMap,
    graph: MetricGraph<'a>,
    database: &'a DatabaseConnection,
    options: &'a SyncOptions,
}

impl<'a, C: SupersetClient + ?Sized> Reconciler<'a, C> {
    pub fn new(
        client: &'a C,
        metrics: &'a MetricMap,
        database: &'a DatabaseConnection,
        options: &'a SyncOptions,
    ) -> Self {
        Self {
            client,
            metrics,
            graph: MetricGraph::build(metrics),
            database,
            options,
        }
    }

    /// Sync one model and return its dataset.
    pub async fn sync_model(&self, model: &Model) -> SyncResult<DatasetSummary> {
        let dataset = locate::find_or_create(self.client, model, self.database).await?;

        // Compile before writing anything, so a bad metric leaves the dataset as it was.
        let detail = self.client.get_dataset(dataset.id).await?;
        let metrics = self.dataset_metrics(model, detail.metrics)?;

        let base = base_update(model, self.options);
        self.client.update_dataset(dataset.id, true, &base).await?;

        if !metrics.is_empty() {
            info!(unique_id = %model.unique_id, count = metrics.len(), "Updating metrics");
            self.client
                .update_dataset(dataset.id, false, &DatasetUpdate::metrics(metrics))
                .await?;
        }

        let columns = column_updates(model);
        if !columns.is_empty() {
            info!(unique_id = %model.unique_id, count = columns.len(), "Updating columns");
            self.client
                .update_dataset(dataset.id, true, &DatasetUpdate::columns(columns))
                .await?;
        }

        Ok(dataset)
    }

    /// Sync every model, collecting failures instead of stopping at them.
    pub async fn sync_all(&self, models: &[Model]) -> SyncReport {
        let mut report = SyncReport::default();

        for model in models {
            match self.sync_model(model).await {
                Ok(dataset) => report.datasets.push(dataset),
                Err(error) => {
                    warn!(
                        unique_id = %model.unique_id,
                        kind = error.kind(),
                        error = %error,
                        "Skipping model"
                    );
                    report.failures.push(SyncFailure {
                        unique_id: model.unique_id.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            synced = report.datasets.len(),
            skipped = report.failures.len(),
            "Sync finished"
        );
        report
    }

    /// Remote-only metrics plus the compiled metrics that belong to the model.
    fn dataset_metrics(
        &self,
        model: &Model,
        existing: Vec<RemoteMetric>,
    ) -> MetricResult<Vec<RemoteMetric>> {
        let compiler = MetricCompiler::new(self.metrics, self.options.aggregate_policy);
        let compiled = self
            .graph
            .metrics_for_model(&model.unique_id)?
            .into_iter()
            .map(|metric| payload::remote_metric(&compiler, metric))
            .collect::<MetricResult<Vec<_>>>()?;

        let manifest_names: BTreeSet<&str> = self.metrics.keys().map(String::as_str).collect();
        Ok(merge_metrics(existing, compiled, &manifest_names))
    }
}

/// Sync models into datasets, returning the datasets that were reconciled.
///
/// Skipped models only show up in the logs; use [`sync_datasets_with_report`]
/// to get them back as values.
pub async fn sync_datasets<C>(
    client: &C,
    models: &[Model],
    metrics: &MetricMap,
    database: &DatabaseConnection,
    options: &SyncOptions,
) -> Vec<DatasetSummary>
where
    C: SupersetClient + ?Sized,
{
    sync_datasets_with_report(client, models, metrics, database, options)
        .await
        .datasets
}

/// Sync models into datasets, returning successes and failures.
pub async fn sync_datasets_with_report<C>(
    client: &C,
    models: &[Model],
    metrics: &MetricMap,
    database: &DatabaseConnection,
    options: &SyncOptions,
) -> SyncReport
where
    C: SupersetClient + ?Sized,
{
    Reconciler::new(client, metrics, database, options)
        .sync_all(models)
        .await
}
