//! Result materialization.
//!
//! Turns the engine's paginated, positional wire response into a sequence of
//! uniform records. Column names are captured once from the first page's
//! metadata and reused as the key set for every record, so all records in a
//! result set share the same keys in the same order. The first row of the
//! first page is the header row and is excluded; follow-up pages carry data
//! rows only.

use serde_json::Value;

use crate::engine::QueryEngine;
use crate::error::Result;

/// One materialized row: an ordered mapping from column name to a string
/// value or an explicit JSON null. Key order matches the engine's column
/// metadata (`serde_json` is built with `preserve_order`).
pub type ResultRecord = serde_json::Map<String, Value>;

/// Fetch every result page for an execution and materialize the rows.
///
/// A result set with zero data rows yields an empty vec without error.
pub async fn materialize(
    engine: &dyn QueryEngine,
    execution_id: &str,
    page_size: usize,
) -> Result<Vec<ResultRecord>> {
    let mut records = Vec::new();
    let mut columns: Vec<String> = Vec::new();
    let mut next_token: Option<String> = None;
    let mut first_page = true;

    loop {
        let page = engine
            .result_page(execution_id, page_size, next_token.as_deref())
            .await?;

        if first_page {
            columns = page.columns;
        }

        // Page 1 leads with the column-name header row; skip it.
        let skip = if first_page { 1 } else { 0 };
        for row in page.rows.into_iter().skip(skip) {
            let mut record = ResultRecord::new();
            for (i, name) in columns.iter().enumerate() {
                // A missing positional value becomes an explicit null so
                // every record carries the full key set.
                let value = match row.get(i) {
                    Some(Some(v)) => Value::String(v.clone()),
                    _ => Value::Null,
                };
                record.insert(name.clone(), value);
            }
            records.push(record);
        }

        first_page = false;
        next_token = page.next_token;
        if next_token.is_none() {
            break;
        }
    }

    Ok(records)
}
