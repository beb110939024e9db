//! `reqwest` implementation of [`SupersetClient`] against `/api/v1/dataset/`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::client::SupersetClient;
use super::error::{RemoteError, RemoteResult};
use super::types::{DatasetDetail, DatasetSummary, DatasetUpdate, NewDataset};

/// Default timeout for requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size for dataset list calls.
const PAGE_SIZE: usize = 100;

/// Superset REST client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    count: usize,
    #[serde(default)]
    result: Vec<DatasetSummary>,
}

#[derive(Debug, Deserialize)]
struct ItemResponse<T> {
    #[serde(default)]
    id: Option<i64>,
    result: T,
}

impl HttpClient {
    /// Create a client for a Superset instance with the default timeout.
    pub fn new(base_url: &str, token: Option<&str>) -> RemoteResult<Self> {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(
        base_url: &str,
        token: Option<&str>,
        timeout: Duration,
    ) -> RemoteResult<Self> {
        // Url::join drops the last path segment unless it ends with '/'.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("superset-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout);

        if let Some(token) = token {
            let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))?;
            auth.set_sensitive(true);

            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, auth);
            builder = builder.default_headers(headers);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> RemoteResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Send a request and fail on non-success statuses.
    async fn execute(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> RemoteResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> RemoteResult<T> {
        let response = self.execute(method, request, url).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SupersetClient for HttpClient {
    async fn find_datasets(
        &self,
        database_id: i64,
        table_name: &str,
    ) -> RemoteResult<Vec<DatasetSummary>> {
        let mut datasets = Vec::new();
        let mut page = 0;

        loop {
            let mut url = self.endpoint("api/v1/dataset/")?;
            url.query_pairs_mut()
                .append_pair("q", &list_query(database_id, table_name, page));

            debug!(%url, "listing datasets");
            let response: ListResponse = self
                .send("GET", self.client.get(url.clone()), &url)
                .await?;

            let received = response.result.len();
            datasets.extend(response.result);
            if received == 0 || datasets.len() >= response.count {
                break;
            }
            page += 1;
        }

        Ok(datasets)
    }

    async fn get_dataset(&self, id: i64) -> RemoteResult<DatasetDetail> {
        let url = self.endpoint(&format!("api/v1/dataset/{id}"))?;
        let response: ItemResponse<DatasetDetail> =
            self.send("GET", self.client.get(url.clone()), &url).await?;

        let mut detail = response.result;
        detail.id = response.id.unwrap_or(id);
        Ok(detail)
    }

    async fn create_dataset(&self, dataset: &NewDataset) -> RemoteResult<DatasetSummary> {
        let url = self.endpoint("api/v1/dataset/")?;
        let response: ItemResponse<serde_json::Value> = self
            .send("POST", self.client.post(url.clone()).json(dataset), &url)
            .await?;

        let id = response
            .id
            .ok_or_else(|| RemoteError::api("dataset create response has no id"))?;

        Ok(DatasetSummary {
            id,
            table_name: dataset.table_name.clone(),
            schema: Some(dataset.schema.clone()),
            extra: None,
        })
    }

    async fn update_dataset(
        &self,
        id: i64,
        override_columns: bool,
        update: &DatasetUpdate,
    ) -> RemoteResult<()> {
        let mut url = self.endpoint(&format!("api/v1/dataset/{id}"))?;
        url.query_pairs_mut()
            .append_pair("override_columns", if override_columns { "true" } else { "false" });

        self.execute("PUT", self.client.put(url.clone()).json(update), &url)
            .await?;
        Ok(())
    }
}

/// Rison-encoded list query filtering by database and table name.
///
/// Superset's list endpoints take their filters as a single rison value in `q`.
pub(crate) fn list_query(database_id: i64, table_name: &str, page: usize) -> String {
    format!(
        "(filters:!((col:database,opr:rel_o_m,value:{database_id}),(col:table_name,opr:eq,value:{})),page:{page},page_size:{PAGE_SIZE})",
        rison_string(table_name)
    )
}

/// Quote a string for rison: `'` and `!` are escaped with `!`.
fn rison_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' || c == '!' {
            out.push('!');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
