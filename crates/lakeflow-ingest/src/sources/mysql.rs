//! MySQL source connector.
//!
//! Extracts rows over a single-connection sqlx pool and resolves every
//! column into the closed [`SourceValue`] variant at the driver boundary,
//! keyed on the column's wire type name.

use async_trait::async_trait;
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::types::BigDecimal;
use sqlx::{Column, MySqlPool, Row, TypeInfo};
use tracing::info;

use crate::error::{IngestError, Result};
use crate::sources::{some_or_null, DataSource, SourceConfig, SourceKind};
use crate::value::{SourceRecord, SourceValue};

pub struct MySqlSource {
    pool: MySqlPool,
}

impl MySqlSource {
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let url = format!(
            "mysql://{}:{}@{}:{}/{}",
            config.user,
            config.password,
            config.host,
            config.port.unwrap_or(3306),
            config.database
        );
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .map_err(|e| IngestError::ConnectionError(format!("mysql: {}", e)))?;
        info!(host = %config.host, database = %config.database, "connected to mysql");
        Ok(Self { pool })
    }

    fn decode_row(row: &MySqlRow) -> SourceRecord {
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

fn decode_column(row: &MySqlRow, idx: usize, type_name: &str) -> SourceValue {
    let decoded: std::result::Result<SourceValue, sqlx::Error> = match type_name {
        "BOOLEAN" | "BOOL" => row
            .try_get::<Option<bool>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Bool)),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Int)),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" => row.try_get::<Option<u64>, _>(idx).map(|v| {
            some_or_null(v, |n| match i64::try_from(n) {
                Ok(i) => SourceValue::Int(i),
                Err(_) => SourceValue::Decimal(n.to_string()),
            })
        }),
        "FLOAT" | "DOUBLE" => row
            .try_get::<Option<f64>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Float)),
        "DECIMAL" => row
            .try_get::<Option<BigDecimal>, _>(idx)
            .map(|v| some_or_null(v, |d| SourceValue::Decimal(d.to_string()))),
        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Date)),
        "DATETIME" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(idx)
            .map(|v| some_or_null(v, |dt| SourceValue::DateTime(dt.and_utc()))),
        "TIMESTAMP" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::DateTime)),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Bytes)),
        "JSON" => row
            .try_get::<Option<serde_json::Value>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::from_json)),
        _ => row
            .try_get::<Option<String>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Text)),
    };

    match decoded {
        Ok(value) => value,
        // Last resort: textual decode, then an opaque marker for the type.
        Err(_) => row
            .try_get::<Option<String>, _>(idx)
            .map(|v| some_or_null(v, SourceValue::Text))
            .unwrap_or_else(|_| SourceValue::Opaque(type_name.to_string())),
    }
}

#[async_trait]
impl DataSource for MySqlSource {
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
        info!(table = %table, rows = records.len(), "extracted from mysql");
        Ok(records)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("mysql connection closed");
    }

    fn kind(&self) -> SourceKind {
        SourceKind::MySql
    }
}
