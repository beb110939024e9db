//! In-memory Superset that records every call made against it.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use superset_sync::superset::{
    DatasetDetail, DatasetSummary, DatasetUpdate, NewDataset, RemoteColumn, RemoteError,
    RemoteMetric, RemoteResult, SupersetClient,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Find { database_id: i64, table_name: String },
    Get(i64),
    Create(NewDataset),
    Update {
        id: i64,
        override_columns: bool,
        update: DatasetUpdate,
    },
}

impl Call {
    /// Short label for asserting call order.
    pub fn label(&self) -> String {
        match self {
            Call::Find { .. } => "find".to_string(),
            Call::Get(_) => "get".to_string(),
            Call::Create(_) => "create".to_string(),
            Call::Update {
                override_columns,
                update,
                ..
            } => {
                let kind = if update.columns.is_some() {
                    "columns"
                } else if update.extra.is_some() {
                    "base"
                } else {
                    "metrics"
                };
                format!("update:{kind}:{override_columns}")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredDataset {
    pub database: i64,
    pub summary: DatasetSummary,
    pub sql: Option<String>,
    pub metrics: Vec<RemoteMetric>,
    pub columns: Vec<RemoteColumn>,
    pub description: Option<String>,
    pub is_managed_externally: Option<bool>,
    pub external_url: Option<String>,
}

#[derive(Default)]
struct State {
    datasets: Vec<StoredDataset>,
    calls: Vec<Call>,
    failing_creates: Vec<String>,
    failing_gets: Vec<i64>,
}

#[derive(Default)]
pub struct FakeSuperset {
    state: Mutex<State>,
}

impl FakeSuperset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing dataset and return its id.
    pub fn seed(
        &self,
        database: i64,
        table_name: &str,
        extra: Option<&str>,
        metrics: Vec<RemoteMetric>,
    ) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.datasets.len() as i64 + 1;
        state.datasets.push(StoredDataset {
            database,
            summary: DatasetSummary {
                id,
                table_name: table_name.to_string(),
                schema: Some("public".to_string()),
                extra: extra.map(str::to_string),
            },
            sql: None,
            metrics,
            columns: Vec::new(),
            description: None,
            is_managed_externally: None,
            external_url: None,
        });
        id
    }

    /// Make dataset creation fail for a table name.
    pub fn fail_create(&self, table_name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_creates
            .push(table_name.to_string());
    }

    /// Make fetching a dataset's detail fail with a server error.
    pub fn fail_get(&self, id: i64) {
        self.state.lock().unwrap().failing_gets.push(id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_labels(&self) -> Vec<String> {
        self.calls().iter().map(Call::label).collect()
    }

    pub fn dataset(&self, id: i64) -> StoredDataset {
        self.state
            .lock()
            .unwrap()
            .datasets
            .iter()
            .find(|d| d.summary.id == id)
            .cloned()
            .unwrap()
    }

    pub fn dataset_count(&self) -> usize {
        self.state.lock().unwrap().datasets.len()
    }

    fn not_found(method: &'static str, id: i64) -> RemoteError {
        RemoteError::Status {
            method,
            url: format!("fake://api/v1/dataset/{id}"),
            status: 404,
            body: "{\"message\": \"Not found\"}".to_string(),
        }
    }
}

#[async_trait]
impl SupersetClient for FakeSuperset {
    async fn find_datasets(
        &self,
        database_id: i64,
        table_name: &str,
    ) -> RemoteResult<Vec<DatasetSummary>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Find {
            database_id,
            table_name: table_name.to_string(),
        });
        Ok(state
            .datasets
            .iter()
            .filter(|d| d.database == database_id && d.summary.table_name == table_name)
            .map(|d| d.summary.clone())
            .collect())
    }

    async fn get_dataset(&self, id: i64) -> RemoteResult<DatasetDetail> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Get(id));
        if state.failing_gets.contains(&id) {
            return Err(RemoteError::Status {
                method: "GET",
                url: format!("fake://api/v1/dataset/{id}"),
                status: 500,
                body: String::new(),
            });
        }
        let dataset = state
            .datasets
            .iter()
            .find(|d| d.summary.id == id)
            .ok_or_else(|| Self::not_found("GET", id))?;
        Ok(DatasetDetail {
            id,
            table_name: dataset.summary.table_name.clone(),
            metrics: dataset.metrics.clone(),
            columns: dataset.columns.clone(),
        })
    }

    async fn create_dataset(&self, dataset: &NewDataset) -> RemoteResult<DatasetSummary> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(dataset.clone()));
        if state.failing_creates.contains(&dataset.table_name) {
            return Err(RemoteError::Status {
                method: "POST",
                url: "fake://api/v1/dataset/".to_string(),
                status: 422,
                body: "{\"message\": {\"table_name\": [\"Table does not exist\"]}}".to_string(),
            });
        }

        let id = state.datasets.len() as i64 + 1;
        let summary = DatasetSummary {
            id,
            table_name: dataset.table_name.clone(),
            schema: Some(dataset.schema.clone()),
            extra: None,
        };
        state.datasets.push(StoredDataset {
            database: dataset.database,
            summary: summary.clone(),
            sql: dataset.sql.clone(),
            metrics: Vec::new(),
            columns: Vec::new(),
            description: None,
            is_managed_externally: None,
            external_url: None,
        });
        Ok(summary)
    }

    async fn update_dataset(
        &self,
        id: i64,
        override_columns: bool,
        update: &DatasetUpdate,
    ) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update {
            id,
            override_columns,
            update: update.clone(),
        });
        let dataset = state
            .datasets
            .iter_mut()
            .find(|d| d.summary.id == id)
            .ok_or_else(|| Self::not_found("PUT", id))?;

        if let Some(extra) = &update.extra {
            dataset.summary.extra = Some(extra.clone());
        }
        if let Some(schema) = &update.schema {
            dataset.summary.schema = Some(schema.clone());
        }
        if update.description.is_some() {
            dataset.description.clone_from(&update.description);
        }
        if update.is_managed_externally.is_some() {
            dataset.is_managed_externally = update.is_managed_externally;
        }
        if update.external_url.is_some() {
            dataset.external_url.clone_from(&update.external_url);
        }
        if let Some(metrics) = &update.metrics {
            dataset.metrics.clone_from(metrics);
        }
        if let Some(columns) = &update.columns {
            dataset.columns = columns
                .iter()
                .map(|c| RemoteColumn {
                    column_name: c.column_name.clone(),
                    description: Some(c.description.clone()),
                    is_dttm: c.is_dttm,
                    data_type: None,
                })
                .collect();
        }
        Ok(())
    }
}
