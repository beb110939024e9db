//! Shared quoting helpers for the dialect implementations.

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB, Snowflake, Redshift, Trino
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL, BigQuery, Databricks
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// Strip the DBAPI suffix from a SQLAlchemy driver name (`postgresql+psycopg2` → `postgresql`).
pub fn backend_name(drivername: &str) -> &str {
    drivername
        .split_once('+')
        .map_or(drivername, |(backend, _)| backend)
}
