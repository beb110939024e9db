//! The remote-state seam.

use async_trait::async_trait;

use super::error::RemoteResult;
use super::types::{DatasetDetail, DatasetSummary, DatasetUpdate, NewDataset};

/// Dataset operations the sync needs from Superset.
///
/// The reconciliation engine receives an implementation explicitly; the
/// HTTP client in [`super::HttpClient`] is one, in-memory fakes in tests are
/// another. Implementations own transport concerns such as retries.
///
/// # Example
///
/// ```ignore
/// use superset_sync::superset::SupersetClient;
///
/// async fn example(client: &impl SupersetClient) -> RemoteResult<()> {
///     let found = client.find_datasets(1, "orders").await?;
///     if let Some(dataset) = found.first() {
///         let detail = client.get_dataset(dataset.id).await?;
///         println!("{} metrics", detail.metrics.len());
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SupersetClient: Send + Sync {
    /// Datasets in a database registered under a table name.
    async fn find_datasets(
        &self,
        database_id: i64,
        table_name: &str,
    ) -> RemoteResult<Vec<DatasetSummary>>;

    /// Full dataset detail, including metrics and columns.
    async fn get_dataset(&self, id: i64) -> RemoteResult<DatasetDetail>;

    /// Create a physical (no `sql`) or virtual dataset.
    async fn create_dataset(&self, dataset: &NewDataset) -> RemoteResult<DatasetSummary>;

    /// Update dataset fields. With `override_columns`, a column list in the
    /// update replaces the existing columns instead of merging into them.
    async fn update_dataset(
        &self,
        id: i64,
        override_columns: bool,
        update: &DatasetUpdate,
    ) -> RemoteResult<()>;
}
