//! Amazon Athena implementation of the query engine boundary.
//!
//! Wraps `aws-sdk-athena`'s start/status/results calls behind the
//! [`QueryEngine`] trait. `QUEUED` and `RUNNING` both map to the gateway's
//! non-terminal state; SDK failures surface as transport errors.

use async_trait::async_trait;
use aws_sdk_athena::types::{
    QueryExecutionContext, QueryExecutionState, ResultConfiguration,
};
use aws_sdk_athena::Client;

use crate::engine::{ExecutionState, ExecutionStatus, QueryEngine, ResultPage};
use crate::error::{QueryError, Result};

/// Athena-backed query engine.
pub struct AthenaEngine {
    client: Client,
    workgroup: String,
}

impl AthenaEngine {
    /// Build an engine from ambient AWS configuration (environment,
    /// profile, or instance role).
    pub async fn from_env(workgroup: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self {
            client: Client::new(&config),
            workgroup: workgroup.to_string(),
        }
    }

    pub fn with_client(client: Client, workgroup: &str) -> Self {
        Self {
            client,
            workgroup: workgroup.to_string(),
        }
    }
}

#[async_trait]
impl QueryEngine for AthenaEngine {
    async fn submit(&self, query: &str, database: &str, output_location: &str) -> Result<String> {
        let response = self
            .client
            .start_query_execution()
            .query_string(query)
            .query_execution_context(
                QueryExecutionContext::builder().database(database).build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(output_location)
                    .build(),
            )
            .work_group(&self.workgroup)
            .send()
            .await
            .map_err(|e| QueryError::Transport(format!("start_query_execution: {}", e)))?;

        response
            .query_execution_id()
            .map(|id| id.to_string())
            .ok_or_else(|| {
                QueryError::Transport("engine returned no execution id".to_string())
            })
    }

    async fn execution_status(&self, execution_id: &str) -> Result<ExecutionStatus> {
        let response = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| QueryError::Transport(format!("get_query_execution: {}", e)))?;

        let status = response
            .query_execution()
            .and_then(|q| q.status())
            .ok_or_else(|| {
                QueryError::Transport("engine returned no execution status".to_string())
            })?;

        let state = match status.state() {
            Some(QueryExecutionState::Succeeded) => ExecutionState::Succeeded,
            Some(QueryExecutionState::Failed) => ExecutionState::Failed,
            Some(QueryExecutionState::Cancelled) => ExecutionState::Cancelled,
            // QUEUED, RUNNING, and anything the SDK adds later.
            _ => ExecutionState::Running,
        };

        Ok(ExecutionStatus {
            state,
            reason: status.state_change_reason().map(|r| r.to_string()),
        })
    }

    async fn result_page(
        &self,
        execution_id: &str,
        page_size: usize,
        next_token: Option<&str>,
    ) -> Result<ResultPage> {
        let response = self
            .client
            .get_query_results()
            .query_execution_id(execution_id)
            .max_results(page_size as i32)
            .set_next_token(next_token.map(|t| t.to_string()))
            .send()
            .await
            .map_err(|e| QueryError::Transport(format!("get_query_results: {}", e)))?;

        let mut page = ResultPage {
            next_token: response.next_token().map(|t| t.to_string()),
            ..Default::default()
        };

        if let Some(result_set) = response.result_set() {
            if let Some(metadata) = result_set.result_set_metadata() {
                page.columns = metadata
                    .column_info()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect();
            }
            page.rows = result_set
                .rows()
                .iter()
                .map(|row| {
                    row.data()
                        .iter()
                        .map(|datum| datum.var_char_value().map(|v| v.to_string()))
                        .collect()
                })
                .collect();
        }

        Ok(page)
    }
}
