//! Analytical query gateway.
//!
//! Submits SQL text to a remote asynchronous query engine, polls the
//! execution at a fixed interval until it reaches a terminal state, and
//! materializes the paginated result set into uniform records.
//!
//! ## Architecture
//!
//! - **Engine boundary**: the [`QueryEngine`] trait plus wire types
//!   ([`ExecutionStatus`], [`ResultPage`]); [`AthenaEngine`] is the Amazon
//!   Athena implementation.
//! - **Gateway**: [`QueryGateway`] drives the submit/poll/materialize state
//!   machine and returns per-call timing in [`QueryOutcome`].
//! - **Materializer**: turns positional result pages into ordered
//!   column-name → value records with a uniform key set.

pub mod athena;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod materialize;

pub use athena::AthenaEngine;
pub use engine::{ExecutionState, ExecutionStatus, QueryEngine, ResultPage};
pub use error::{QueryError, Result};
pub use gateway::{GatewayConfig, QueryGateway, QueryOutcome};
pub use materialize::{materialize, ResultRecord};
