//! PostgreSQL source connector.
//!
//! Same shape as the MySQL connector: a single-connection sqlx pool and a
//! per-column decode into the closed [`SourceValue`] variant, keyed on the
//! column's wire type name.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::BigDecimal;
use sqlx::{Column, PgPool, Row, TypeInfo};
use tracing::info;

use crate::error::{IngestError, Result};
use crate::sources::{some_or_null, DataSource, SourceConfig, SourceKind};
use crate::value::{SourceRecord, SourceValue};

pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let url = format!(
            "postgresql://{}:{}@{}:{}/{}",
            config.user,
            config.password,
            config.host,
            config.port.unwrap_or(5432),
            config.database
        );
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .map_err(|e| IngestError::ConnectionError(format!("postgresql: {}", e)))?;
        info!(host = %config.host, database = %config.database, "connected to postgresql");
        Ok(Self { pool })
    }

    fn decode_row(row: &PgRow) -> SourceRecord {
        let fields = row
            .columns()
            .iter()
            .map(|col| {
                let name = col.name().to_string();
                (name, decode_column(row, col.ordinal(), col.type_info().name()))
            })
            .collect();
        SourceRecord::new(fields)
    }
}

fn decode_column(row: &PgRow, idx: usize, type_name: &str) -> SourceValue {
    let decoded: std::result::Result<SourceValue, sqlx::Error> = match type_name {
        "BOOL" => row
            .try_get::<Option<bool>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Bool)),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)
            .map(|v| some_or_null(v, |n| SourceValue::Int(n as i64))),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)
            .map(|v| some_or_null(v, |n| SourceValue::Int(n as i64))),
        "INT8" => row
            .try_get::<Option<i64>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Int)),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)
            .map(|v| some_or_null(v, |f| SourceValue::Float(f as f64))),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Float)),
        "NUMERIC" => row
            .try_get::<Option<BigDecimal>, _>(idx)
            .map(|v| some_or_null(v, |d| SourceValue::Decimal(d.to_string()))),
        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Date)),
        "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(idx)
            .map(|v| some_or_null(v, |dt| SourceValue::DateTime(dt.and_utc()))),
        "TIMESTAMPTZ" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::DateTime)),
        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Bytes)),
        "JSON" | "JSONB" => row
            .try_get::<Option<serde_json::Value>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::from_json)),
        "UUID" => row
            .try_get::<Option<sqlx::types::Uuid>, _>(idx)
            .map(|v| some_or_null(v, |u| SourceValue::Text(u.to_string()))),
        _ => row
            .try_get::<Option<String>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Text)),
    };

    match decoded {
        Ok(value) => value,
        Err(_) => row
            .try_get::<Option<String>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Text))
            .unwrap_or_else(|_| SourceValue::Opaque(type_name.to_string())),
    }
}

#[async_trait]
impl DataSource for PostgresSource {
    async fn extract(
        &self,
        table: &str,
        custom_query: Option<&str>,
    ) -> Result<Vec<SourceRecord>> {
        let sql = match custom_query {
            Some(q) => q.to_string(),
            None => format!("SELECT * FROM {}", table),
        };
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| IngestError::ExtractionError(format!("{}: {}", table, e)))?;

        let records: Vec<SourceRecord> = rows.iter().map(Self::decode_row).collect();
        info!(table = %table, rows = records.len(), "extracted from postgresql");
        Ok(records)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("postgresql connection closed");
    }

    fn kind(&self) -> SourceKind {
        SourceKind::PostgreSql
    }
}
