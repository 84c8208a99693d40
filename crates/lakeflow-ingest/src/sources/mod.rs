//! Source database connectors.
//!
//! One implementation per source kind behind the [`DataSource`] trait:
//! relational sources (MySQL, PostgreSQL) and a document source (MongoDB).
//! A connector owns exactly one connection for the duration of a run.

pub mod mongo;
pub mod mysql;
pub mod postgres;

use async_trait::async_trait;

use crate::error::{IngestError, Result};
use crate::value::SourceRecord;

pub use mongo::MongoSource;
pub use mysql::MySqlSource;
pub use postgres::PostgresSource;

/// Map a nullable decoded value into the source model.
pub(crate) fn some_or_null<T>(
    value: Option<T>,
    f: impl FnOnce(T) -> crate::value::SourceValue,
) -> crate::value::SourceValue {
    value.map(f).unwrap_or(crate::value::SourceValue::Null)
}

/// Supported source database kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    MySql,
    PostgreSql,
    MongoDb,
}

impl SourceKind {
    /// Parse from a string (case-insensitive).
    pub fn from_str_config(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(SourceKind::MySql),
            "postgresql" | "postgres" | "pg" => Ok(SourceKind::PostgreSql),
            "mongodb" | "mongo" => Ok(SourceKind::MongoDb),
            other => Err(IngestError::ConfigError(format!(
                "unsupported source kind '{}': must be 'mysql', 'postgresql', or 'mongodb'",
                other
            ))),
        }
    }

    /// Whether this kind accepts a custom extraction query.
    pub fn supports_custom_query(&self) -> bool {
        !matches!(self, SourceKind::MongoDb)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::MySql => write!(f, "mysql"),
            SourceKind::PostgreSql => write!(f, "postgresql"),
            SourceKind::MongoDb => write!(f, "mongodb"),
        }
    }
}

/// Connection settings for a source database.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl SourceConfig {
    /// Read connection settings from the environment
    /// (`DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`).
    pub fn from_env() -> Result<Self> {
        let require = |key: &str| {
            std::env::var(key).map_err(|_| {
                IngestError::ConfigError(format!("{} environment variable required", key))
            })
        };

        let port = match std::env::var("DB_PORT") {
            Ok(v) => Some(v.parse::<u16>().map_err(|e| {
                IngestError::ConfigError(format!("invalid DB_PORT: {}", e))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            host: require("DB_HOST")?,
            port,
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
            database: require("DB_NAME")?,
        })
    }
}

/// A connected source ready to extract rows or documents.
///
/// One connection is opened per run and must be released on all exit paths
/// via [`DataSource::close`].
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Extract every row/document from the named table or collection, or
    /// run a custom query instead (relational sources only).
    async fn extract(
        &self,
        table: &str,
        custom_query: Option<&str>,
    ) -> Result<Vec<SourceRecord>>;

    /// Release the connection.
    async fn close(&self);

    /// The source kind this connector serves.
    fn kind(&self) -> SourceKind;
}

/// Open a connection for the given kind and settings.
pub async fn connect(kind: SourceKind, config: &SourceConfig) -> Result<Box<dyn DataSource>> {
    match kind {
        SourceKind::MySql => Ok(Box::new(MySqlSource::connect(config).await?)),
        SourceKind::PostgreSql => Ok(Box::new(PostgresSource::connect(config).await?)),
        SourceKind::MongoDb => Ok(Box::new(MongoSource::connect(config).await?)),
    }
}
