//! SQL dialect definitions.
//!
//! The sync only emits SQL of its own in one place: the body of a virtual
//! dataset, `SELECT * FROM <db>.<schema>.<table>`, which must quote each part
//! the way the target engine expects. Dialects also decide what "the same
//! database" means for a connection URL.
//!
//! | Dialect | Quoting | Same-database key |
//! |---------|---------|-------------------|
//! | Postgres, Redshift, DuckDB, Snowflake, Trino, ANSI | `"x"` | database |
//! | MySQL, Databricks | `` `x` `` | database |
//! | BigQuery | `` `x` `` | host (GCP project) |
//! | T-SQL | `[x]` | database |
//!
//! # Usage
//!
//! ```ignore
//! use superset_sync::sql::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::from_driver("postgresql+psycopg2");
//! let source = dialect.quote_qualified(&["warehouse", "public", "orders"]);
//! ```

pub mod helpers;

use crate::config::DatabaseUrl;

/// SQL dialect trait - how identifiers are quoted and databases compared.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (database, schema, table).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote each part of a dotted name and join with `.`.
    fn quote_qualified(&self, parts: &[&str]) -> String {
        parts
            .iter()
            .map(|part| self.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The part of a connection URL that names the database models live in.
    ///
    /// Most engines put it in the URL path; BigQuery puts the project in the host.
    fn database_key<'u>(&self, url: &'u DatabaseUrl) -> Option<&'u str> {
        url.database.as_deref()
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Ansi,
    Postgres,
    MySql,
    TSql,
    DuckDb,
    Snowflake,
    BigQuery,
    Redshift,
    Databricks,
    Trino,
}

impl Dialect {
    /// Pick a dialect from a SQLAlchemy driver name. Unknown drivers get ANSI quoting.
    pub fn from_driver(drivername: &str) -> Self {
        match helpers::backend_name(drivername).to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Dialect::Postgres,
            "mysql" | "mariadb" => Dialect::MySql,
            "mssql" => Dialect::TSql,
            "duckdb" => Dialect::DuckDb,
            "snowflake" => Dialect::Snowflake,
            "bigquery" => Dialect::BigQuery,
            "redshift" => Dialect::Redshift,
            "databricks" | "hive" => Dialect::Databricks,
            "trino" | "presto" => Dialect::Trino,
            _ => Dialect::Ansi,
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        match self {
            Dialect::Ansi => "ansi",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::TSql => "tsql",
            Dialect::DuckDb => "duckdb",
            Dialect::Snowflake => "snowflake",
            Dialect::BigQuery => "bigquery",
            Dialect::Redshift => "redshift",
            Dialect::Databricks => "databricks",
            Dialect::Trino => "trino",
        }
    }

    fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Dialect::MySql | Dialect::BigQuery | Dialect::Databricks => {
                helpers::quote_backtick(ident)
            }
            Dialect::TSql => helpers::quote_bracket(ident),
            Dialect::Ansi
            | Dialect::Postgres
            | Dialect::DuckDb
            | Dialect::Snowflake
            | Dialect::Redshift
            | Dialect::Trino => helpers::quote_double(ident),
        }
    }

    fn database_key<'u>(&self, url: &'u DatabaseUrl) -> Option<&'u str> {
        match self {
            Dialect::BigQuery => url.host.as_deref(),
            _ => url.database.as_deref(),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
