//! SQL helpers.
//!
//! - [`dialect`] - identifier quoting and same-database rules per engine

pub mod dialect;

pub use dialect::{Dialect, SqlDialect};
