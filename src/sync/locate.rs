//! Find the dataset backing a model, or create it.

use tracing::{error, info};

use super::error::{SyncError, SyncResult};
use crate::config::DatabaseConnection;
use crate::model::Model;
use crate::superset::{DatasetSummary, NewDataset, SupersetClient};

/// Look up the model's dataset by database and table name.
///
/// When several datasets share the table name, the one whose `extra` carries
/// the model's unique id is chosen. Zero or several such matches is an
/// ambiguity. When nothing shares the table name, the dataset is created.
pub(super) async fn find_or_create<C>(
    client: &C,
    model: &Model,
    database: &DatabaseConnection,
) -> SyncResult<DatasetSummary>
where
    C: SupersetClient + ?Sized,
{
    let table_name = model.table_name();
    let mut existing = client.find_datasets(database.id, table_name).await?;

    if existing.len() > 1 {
        let candidates = existing.len();
        existing.retain(|dataset| dataset.unique_id().as_deref() == Some(model.unique_id.as_str()));
        if existing.len() != 1 {
            return Err(SyncError::AmbiguousDataset {
                unique_id: model.unique_id.clone(),
                table_name: table_name.to_string(),
                candidates,
                matching: existing.len(),
            });
        }
    }

    if let Some(dataset) = existing.into_iter().next() {
        info!(unique_id = %model.unique_id, dataset_id = dataset.id, "Updating dataset");
        return Ok(dataset);
    }

    info!(unique_id = %model.unique_id, "Creating dataset");
    let request = new_dataset(model, database);
    client.create_dataset(&request).await.map_err(|source| {
        error!(unique_id = %model.unique_id, error = %source, "Unable to create dataset");
        SyncError::DatasetCreation {
            unique_id: model.unique_id.clone(),
            source,
        }
    })
}

/// Physical dataset when the model lives in the connection's database,
/// otherwise a virtual dataset selecting across databases.
pub fn new_dataset(model: &Model, database: &DatabaseConnection) -> NewDataset {
    let sql = if database.contains_model(model) {
        None
    } else {
        Some(database.virtual_source(model))
    };

    NewDataset {
        database: database.id,
        schema: model.schema.clone(),
        table_name: model.table_name().to_string(),
        sql,
    }
}
