//! Query gateway: the polling state machine.
//!
//! Submits a query, polls the engine's execution status at a fixed interval
//! until it reaches a terminal state or the wall-clock wait budget runs out,
//! then materializes the full result set. Query durations are seconds to
//! minutes, so a fixed poll interval is used rather than backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::engine::{ExecutionState, QueryEngine};
use crate::error::{QueryError, Result};
use crate::materialize::{materialize, ResultRecord};

/// Default maximum wall-clock wait for one query.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60);

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default rows per result page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Gateway configuration.
///
/// Poll interval and max wait are explicit so tests can run with
/// sub-millisecond intervals.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Default logical database queries run against.
    pub database: String,
    /// Output staging location handed to the engine at submission.
    pub output_location: String,
    /// Engine workgroup.
    pub workgroup: String,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub page_size: usize,
}

impl GatewayConfig {
    pub fn new(database: &str, output_location: &str) -> Self {
        Self {
            database: database.to_string(),
            output_location: output_location.to_string(),
            workgroup: "primary".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Read configuration from the environment.
    ///
    /// - `ATHENA_DATABASE` (default `datalake_raw`)
    /// - `ATHENA_OUTPUT_LOCATION` (required)
    /// - `ATHENA_WORKGROUP` (default `primary`)
    /// - `QUERY_MAX_WAIT_SECS` (default 60)
    /// - `QUERY_POLL_INTERVAL_MS` (default 500)
    pub fn from_env() -> Result<Self> {
        let database =
            std::env::var("ATHENA_DATABASE").unwrap_or_else(|_| "datalake_raw".to_string());
        let output_location = std::env::var("ATHENA_OUTPUT_LOCATION").map_err(|_| {
            QueryError::ConfigError("ATHENA_OUTPUT_LOCATION environment variable required".into())
        })?;
        let workgroup =
            std::env::var("ATHENA_WORKGROUP").unwrap_or_else(|_| "primary".to_string());

        let max_wait = std::env::var("QUERY_MAX_WAIT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_MAX_WAIT);
        let poll_interval = std::env::var("QUERY_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        Ok(Self {
            database,
            output_location,
            workgroup,
            poll_interval,
            max_wait,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }
}

/// The result of one gateway call: the materialized records plus the
/// wall-clock time from submission to full materialization.
///
/// Timing is returned per call rather than kept on the gateway, so
/// concurrent callers never observe each other's measurements.
#[derive(Debug)]
pub struct QueryOutcome {
    pub records: Vec<ResultRecord>,
    pub elapsed_ms: u64,
}

/// Submits queries and drives them to completion.
///
/// Each call is independent; the gateway holds no mutable state between
/// invocations.
pub struct QueryGateway {
    engine: Arc<dyn QueryEngine>,
    config: GatewayConfig,
}

impl QueryGateway {
    pub fn new(engine: Arc<dyn QueryEngine>, config: GatewayConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Execute a query against the given database (or the configured
    /// default), blocking until the result set is fully materialized.
    pub async fn execute(&self, query: &str, database: Option<&str>) -> Result<QueryOutcome> {
        let started = Instant::now();
        let db = database.unwrap_or(&self.config.database);

        debug!(database = %db, "submitting query: {:.100}", query);
        let execution_id = self
            .engine
            .submit(query, db, &self.config.output_location)
            .await?;
        info!(execution_id = %execution_id, "query submitted");

        self.wait_for_completion(&execution_id, started).await?;

        let records = materialize(self.engine.as_ref(), &execution_id, self.config.page_size)
            .await?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            execution_id = %execution_id,
            rows = records.len(),
            elapsed_ms,
            "query completed"
        );

        Ok(QueryOutcome {
            records,
            elapsed_ms,
        })
    }

    /// Poll at a fixed interval until the execution reaches a terminal
    /// state. No poll is issued after a terminal state is observed, and no
    /// cancel call is sent on timeout; the remote query is left as-is.
    async fn wait_for_completion(&self, execution_id: &str, started: Instant) -> Result<()> {
        loop {
            let status = self.engine.execution_status(execution_id).await?;

            match status.state {
                ExecutionState::Succeeded => {
                    debug!(execution_id = %execution_id, "execution succeeded");
                    return Ok(());
                }
                ExecutionState::Failed | ExecutionState::Cancelled => {
                    let reason = status.reason.unwrap_or_else(|| "Unknown".to_string());
                    warn!(execution_id = %execution_id, state = %status.state, reason = %reason, "execution did not succeed");
                    return Err(QueryError::Failed(reason));
                }
                ExecutionState::Running => {
                    if started.elapsed() > self.config.max_wait {
                        warn!(execution_id = %execution_id, "polling exceeded max wait");
                        return Err(QueryError::TimedOut(self.config.max_wait));
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::engine::{ExecutionStatus, ResultPage};

    /// Fake engine: replays a scripted sequence of statuses, then serves a
    /// single result page. Counts status polls.
    struct ScriptedEngine {
        statuses: Mutex<Vec<ExecutionStatus>>,
        page: ResultPage,
        poll_count: AtomicUsize,
    }

    impl ScriptedEngine {
        fn new(statuses: Vec<ExecutionStatus>, page: ResultPage) -> Self {
            Self {
                statuses: Mutex::new(statuses),
                page,
                poll_count: AtomicUsize::new(0),
            }
        }

        fn running() -> ExecutionStatus {
            ExecutionStatus {
                state: ExecutionState::Running,
                reason: None,
            }
        }

        fn succeeded() -> ExecutionStatus {
            ExecutionStatus {
                state: ExecutionState::Succeeded,
                reason: None,
            }
        }
    }

    #[async_trait]
    impl QueryEngine for ScriptedEngine {
        async fn submit(&self, _: &str, _: &str, _: &str) -> Result<String> {
            Ok("exec-42".to_string())
        }

        async fn execution_status(&self, _: &str) -> Result<ExecutionStatus> {
            self.poll_count.fetch_add(1, Ordering::SeqCst);
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                Ok(statuses.remove(0))
            } else {
                // Keep replaying the final status.
                Ok(statuses[0].clone())
            }
        }

        async fn result_page(
            &self,
            _: &str,
            _: usize,
            _: Option<&str>,
        ) -> Result<ResultPage> {
            Ok(self.page.clone())
        }
    }

    fn fast_config() -> GatewayConfig {
        let mut config = GatewayConfig::new("test_db", "s3://test/results/");
        config.poll_interval = Duration::from_millis(1);
        config.max_wait = Duration::from_millis(50);
        config
    }

    fn one_row_page() -> ResultPage {
        ResultPage {
            columns: vec!["v".into()],
            rows: vec![
                vec![Some("v".to_string())],
                vec![Some("1".to_string())],
            ],
            next_token: None,
        }
    }

    // ---------------------------------------------------------------
    // Happy path
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn test_execute_succeeds_after_running() {
        let engine = Arc::new(ScriptedEngine::new(
            vec![
                ScriptedEngine::running(),
                ScriptedEngine::running(),
                ScriptedEngine::succeeded(),
            ],
            one_row_page(),
        ));
        let gateway = QueryGateway::new(engine.clone(), fast_config());

        let outcome = gateway.execute("SELECT 1", None).await.unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0]["v"], "1");
        assert_eq!(engine.poll_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_poll_after_terminal_state() {
        // SUCCEEDED on the first poll; exactly one status fetch is issued.
        let engine = Arc::new(ScriptedEngine::new(
            vec![ScriptedEngine::succeeded()],
            one_row_page(),
        ));
        let gateway = QueryGateway::new(engine.clone(), fast_config());

        gateway.execute("SELECT 1", None).await.unwrap();
        assert_eq!(engine.poll_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_database_override() {
        struct CapturingEngine {
            database: Mutex<String>,
        }

        #[async_trait]
        impl QueryEngine for CapturingEngine {
            async fn submit(&self, _: &str, database: &str, _: &str) -> Result<String> {
                *self.database.lock().unwrap() = database.to_string();
                Ok("id".to_string())
            }
            async fn execution_status(&self, _: &str) -> Result<ExecutionStatus> {
                Ok(ExecutionStatus {
                    state: ExecutionState::Succeeded,
                    reason: None,
                })
            }
            async fn result_page(&self, _: &str, _: usize, _: Option<&str>) -> Result<ResultPage> {
                Ok(ResultPage::default())
            }
        }

        let engine = Arc::new(CapturingEngine {
            database: Mutex::new(String::new()),
        });
        let gateway = QueryGateway::new(engine.clone(), fast_config());

        gateway.execute("SELECT 1", Some("other_db")).await.unwrap();
        assert_eq!(*engine.database.lock().unwrap(), "other_db");

        gateway.execute("SELECT 1", None).await.unwrap();
        assert_eq!(*engine.database.lock().unwrap(), "test_db");
    }

    // ---------------------------------------------------------------
    // Failure paths
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn test_failed_carries_engine_reason() {
        let engine = Arc::new(ScriptedEngine::new(
            vec![ExecutionStatus {
                state: ExecutionState::Failed,
                reason: Some("SYNTAX_ERROR: line 3".to_string()),
            }],
            ResultPage::default(),
        ));
        let gateway = QueryGateway::new(engine, fast_config());

        let err = gateway.execute("SELECT x FROM", None).await.unwrap_err();
        match err {
            QueryError::Failed(reason) => assert_eq!(reason, "SYNTAX_ERROR: line 3"),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_without_reason_defaults_to_unknown() {
        let engine = Arc::new(ScriptedEngine::new(
            vec![ExecutionStatus {
                state: ExecutionState::Cancelled,
                reason: None,
            }],
            ResultPage::default(),
        ));
        let gateway = QueryGateway::new(engine, fast_config());

        let err = gateway.execute("SELECT 1", None).await.unwrap_err();
        match err {
            QueryError::Failed(reason) => assert_eq!(reason, "Unknown"),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_never_transitioning_engine_times_out() {
        // The engine stays RUNNING forever; a short max wait must produce
        // TimedOut rather than an infinite loop.
        let engine = Arc::new(ScriptedEngine::new(
            vec![ScriptedEngine::running()],
            ResultPage::default(),
        ));
        let gateway = QueryGateway::new(engine, fast_config());

        let err = gateway.execute("SELECT 1", None).await.unwrap_err();
        assert!(matches!(err, QueryError::TimedOut(_)));
    }

    #[tokio::test]
    async fn test_submission_failure_is_transport() {
        struct BrokenEngine;

        #[async_trait]
        impl QueryEngine for BrokenEngine {
            async fn submit(&self, _: &str, _: &str, _: &str) -> Result<String> {
                Err(QueryError::Transport("connection refused".to_string()))
            }
            async fn execution_status(&self, _: &str) -> Result<ExecutionStatus> {
                unreachable!()
            }
            async fn result_page(&self, _: &str, _: usize, _: Option<&str>) -> Result<ResultPage> {
                unreachable!()
            }
        }

        let gateway = QueryGateway::new(Arc::new(BrokenEngine), fast_config());
        let err = gateway.execute("SELECT 1", None).await.unwrap_err();
        assert!(matches!(err, QueryError::Transport(_)));
    }

    // ---------------------------------------------------------------
    // Timing
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn test_outcome_reports_elapsed() {
        let engine = Arc::new(ScriptedEngine::new(
            vec![ScriptedEngine::running(), ScriptedEngine::succeeded()],
            one_row_page(),
        ));
        let gateway = QueryGateway::new(engine, fast_config());

        let outcome = gateway.execute("SELECT 1", None).await.unwrap();
        // One 1ms poll sleep happened, so the measurement is non-trivially
        // bounded by the configured max wait.
        assert!(outcome.elapsed_ms <= 50);
    }
}
