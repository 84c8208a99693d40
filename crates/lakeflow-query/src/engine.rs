//! The query engine boundary.
//!
//! Defines the `QueryEngine` trait that the gateway drives, along with the
//! wire-level types exchanged across it: execution states, statuses, and
//! paginated result pages. Implementations submit a query, report its status,
//! and serve result pages by continuation token.

use async_trait::async_trait;

use crate::error::Result;

/// State of a submitted query execution as reported by the engine.
///
/// These are the wire states; a gateway-side timeout is not an engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Queued or actively running.
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl ExecutionState {
    /// Whether this state is terminal. Once terminal, the engine never
    /// reports a different state for the same execution.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionState::Running)
    }
}

impl std::fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionState::Running => write!(f, "RUNNING"),
            ExecutionState::Succeeded => write!(f, "SUCCEEDED"),
            ExecutionState::Failed => write!(f, "FAILED"),
            ExecutionState::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Status of one execution: the state plus the engine's reason string,
/// present when the engine supplies one for a failed or cancelled query.
#[derive(Debug, Clone)]
pub struct ExecutionStatus {
    pub state: ExecutionState,
    pub reason: Option<String>,
}

/// One page of a paginated result fetch.
#[derive(Debug, Clone, Default)]
pub struct ResultPage {
    /// Ordered column names from the engine's column metadata.
    pub columns: Vec<String>,
    /// Rows in engine order; each row is positional optional string values.
    pub rows: Vec<Vec<Option<String>>>,
    /// Continuation token; `None` means this is the last page.
    pub next_token: Option<String>,
}

/// An asynchronous analytical query engine.
///
/// The engine accepts a query, runs it remotely, and exposes the execution's
/// status and paginated results. All methods surface transport-level
/// failures as [`crate::QueryError::Transport`].
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submit a query against a logical database, staging output at the
    /// given location. Returns the opaque execution identifier.
    async fn submit(&self, query: &str, database: &str, output_location: &str) -> Result<String>;

    /// Fetch the current status of an execution.
    async fn execution_status(&self, execution_id: &str) -> Result<ExecutionStatus>;

    /// Fetch one result page. `next_token` of `None` requests the first page.
    async fn result_page(
        &self,
        execution_id: &str,
        page_size: usize,
        next_token: Option<&str>,
    ) -> Result<ResultPage>;
}
