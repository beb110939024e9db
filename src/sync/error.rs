//! Per-model sync error types.

use thiserror::Error;

use crate::metrics::MetricError;
use crate::superset::RemoteError;

/// Result type for syncing one model.
pub type SyncResult<T> = Result<T, SyncError>;

/// Why a model was skipped. None of these stop the rest of the batch.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Several datasets share the model's table name and its unique id
    /// does not single one out.
    #[error("more than one dataset found for {unique_id}: {candidates} datasets named {table_name}, {matching} with a matching unique id")]
    AmbiguousDataset {
        unique_id: String,
        table_name: String,
        candidates: usize,
        matching: usize,
    },

    /// The dataset did not exist and creating it failed.
    #[error("unable to create dataset for {unique_id}: {source}")]
    DatasetCreation {
        unique_id: String,
        #[source]
        source: RemoteError,
    },

    /// A metric attached to the model could not be compiled.
    #[error(transparent)]
    Metric(#[from] MetricError),

    /// Any other remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl SyncError {
    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AmbiguousDataset { .. } => "ambiguous_dataset",
            Self::DatasetCreation { .. } => "dataset_creation",
            Self::Metric(_) => "metric",
            Self::Remote(_) => "remote",
        }
    }
}
