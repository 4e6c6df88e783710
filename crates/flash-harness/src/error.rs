// crates/flash-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Failures that abort a regression scenario.
// Purpose: Unify config, RPC, process, and oracle failures under one type.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every variant is fatal to the scenario that raised it. A nonzero
//! liquidator exit is deliberately not an error; only the parsed output and
//! the expectation decide a scenario.

use std::time::Duration;

use flash_harness_config::ConfigError;
use liquidator_oracle::ExpectationError;
use liquidator_oracle::ParseError;
use thiserror::Error;

use crate::rpc::RpcError;

/// Scenario-level failures.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The node rejected or failed a JSON-RPC call.
    #[error(transparent)]
    Rpc(#[from] RpcError),
    /// The liquidator output is not a valid JSON-lines stream.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The liquidator output did not meet the scenario expectation.
    #[error(transparent)]
    Expectation(#[from] ExpectationError),
    /// The node did not become ready or reports the wrong chain.
    #[error("node error: {0}")]
    Node(String),
    /// Contract deployment failed.
    #[error("deploy error: {0}")]
    Deploy(String),
    /// The liquidator process could not be started or observed.
    #[error("process error: {0}")]
    Process(String),
    /// A bounded wait expired.
    #[error("{what} timed out after {}ms", elapsed.as_millis())]
    Timeout {
        /// What was being waited on.
        what: String,
        /// Time spent waiting.
        elapsed: Duration,
    },
    /// A replayed transaction failed.
    #[error("replay error: {0}")]
    Replay(String),
    /// Artifact or workspace I/O failed.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
