//! Superset remote-state client.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │         sync (reconciliation)            │
//! └──────────────────────────────────────────┘
//!                    │ &dyn SupersetClient
//!                    ▼
//! ┌──────────────────────────────────────────┐
//! │  HttpClient (reqwest)  │  test fakes     │
//! └──────────────────────────────────────────┘
//!                    │ JSON over HTTPS
//!                    ▼
//! ┌──────────────────────────────────────────┐
//! │        Superset /api/v1/dataset/         │
//! └──────────────────────────────────────────┘
//! ```

mod client;
mod error;
mod http;
pub mod types;

pub use client::SupersetClient;
pub use error::{RemoteError, RemoteResult};
pub use http::HttpClient;
pub use types::{
    Certification, ColumnUpdate, DatasetDetail, DatasetExtra, DatasetSummary, DatasetUpdate,
    NewDataset, RemoteColumn, RemoteMetric,
};
