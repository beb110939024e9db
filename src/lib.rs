//! # superset-sync
//!
//! Keeps Apache Superset datasets in step with a dbt project.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                dbt manifest.json                         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [manifest]
//! ┌─────────────────────────────────────────────────────────┐
//! │             Model / Metric records                       │
//! └─────────────────────────────────────────────────────────┘
//!              │                             │
//!              │                             ▼ [metrics]
//!              │            ┌───────────────────────────────┐
//!              │            │  dependency graph + compiler  │
//!              │            │  metric → SQL expression      │
//!              │            └───────────────────────────────┘
//!              ▼ [sync]                      │
//! ┌─────────────────────────────────────────────────────────┐
//! │   locate/create dataset, merge metrics, push updates     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [superset]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Superset /api/v1/dataset/                   │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod manifest;
pub mod metrics;
pub mod model;
pub mod sql;
pub mod superset;
pub mod sync;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{DatabaseConnection, Settings};
    pub use crate::manifest::Manifest;
    pub use crate::metrics::{compile_metric, AggregatePolicy, MetricError, MetricGraph};
    pub use crate::model::{Column, Metric, MetricFilter, MetricMap, Model};
    pub use crate::sql::{Dialect, SqlDialect};
    pub use crate::superset::{HttpClient, SupersetClient};
    pub use crate::sync::{sync_datasets, sync_datasets_with_report, SyncError, SyncOptions};
}

pub use metrics::compile_metric;
pub use sync::{sync_datasets, SyncOptions};
