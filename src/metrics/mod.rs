//! Metric expression compiler.
//!
//! Turns dbt metric definitions into flat SQL expressions suitable for a
//! Superset metric:
//!
//! ```text
//! sum(amount) where status = 'paid'
//!     → SUM(CASE WHEN status = 'paid' THEN amount END)
//!
//! derived: revenue / orders
//!     → SUM(amount) / COUNT(order_id)
//! ```
//!
//! Compilation is pure: it reads only the metric map it is given.
//!
//! # Example
//!
//! ```ignore
//! use superset_sync::metrics::{compile_metric, AggregatePolicy};
//!
//! let sql = compile_metric("revenue", &metrics, AggregatePolicy::Plain)?;
//! ```

mod compiler;
mod error;
pub mod graph;
mod template;

pub use compiler::{
    apply_filters, compile_metric, compile_metric_default, AggregatePolicy, MetricCompiler,
};
pub use error::{MetricError, MetricResult};
pub use graph::MetricGraph;
