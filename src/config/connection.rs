//! Target database descriptor.
//!
//! Superset stores each database as an id plus a SQLAlchemy URI, e.g.
//! `postgresql+psycopg2://user@host:5432/warehouse` or
//! `bigquery://my-project/analytics`. The sync needs three things from it:
//! the driver (to pick a dialect), and the host and database name (to decide
//! whether a model lives in the same database as the connection).

use url::Url;

use crate::model::Model;
use crate::sql::{Dialect, SqlDialect};

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Invalid database URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
}

/// The parts of a SQLAlchemy URI the sync cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    /// Full driver name, including any `+dbapi` suffix.
    pub drivername: String,
    pub host: Option<String>,
    /// First path segment, if any.
    pub database: Option<String>,
}

impl DatabaseUrl {
    pub fn parse(uri: &str) -> Result<Self, ConnectionError> {
        let url = Url::parse(uri).map_err(|source| ConnectionError::InvalidUri {
            uri: uri.to_string(),
            source,
        })?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        let database = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);

        Ok(Self {
            drivername: url.scheme().to_string(),
            host,
            database,
        })
    }
}

/// A Superset database: the connection datasets are created against.
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    /// Superset database id.
    pub id: i64,
    pub sqlalchemy_uri: String,
    pub url: DatabaseUrl,
    pub dialect: Dialect,
}

impl DatabaseConnection {
    /// Describe a database from its Superset id and SQLAlchemy URI.
    ///
    /// The dialect is derived from the driver name.
    pub fn new(id: i64, sqlalchemy_uri: impl Into<String>) -> Result<Self, ConnectionError> {
        let sqlalchemy_uri = sqlalchemy_uri.into();
        let url = DatabaseUrl::parse(&sqlalchemy_uri)?;
        let dialect = Dialect::from_driver(&url.drivername);

        Ok(Self {
            id,
            sqlalchemy_uri,
            url,
            dialect,
        })
    }

    /// Override the dialect derived from the driver name.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Whether the model's database is the one this connection points at.
    pub fn contains_model(&self, model: &Model) -> bool {
        self.dialect.database_key(&self.url) == Some(model.database.as_str())
    }

    /// `SELECT *` over the model's fully qualified relation, for virtual datasets.
    pub fn virtual_source(&self, model: &Model) -> String {
        let source = self.dialect.quote_qualified(&[
            model.database.as_str(),
            model.schema.as_str(),
            model.table_name(),
        ]);
        format!("SELECT * FROM {source}")
    }
}
