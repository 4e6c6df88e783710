// crates/flash-harness/src/fork.rs
// ============================================================================
// Module: Mainnet Forks
// Description: Historical fork points and the node reset that selects one.
// Purpose: Pin every scenario to an exact mainnet block.
// Dependencies: serde_json, tracing
// ============================================================================

//! ## Overview
//! A [`ForkPoint`] names an archive endpoint and a block number. Archive URLs
//! usually embed an API key in their path, so the `Display` form keeps only
//! scheme and host.

use std::fmt;

use serde_json::Value;
use serde_json::json;
use tracing::info;

use crate::error::HarnessError;
use crate::rpc::RpcClient;

/// Archive endpoint plus block to fork from.
#[derive(Clone, PartialEq, Eq)]
pub struct ForkPoint {
    /// Archive node URL (may carry an API key).
    pub archive_url: String,
    /// Mainnet block number.
    pub block_number: u64,
}

impl ForkPoint {
    /// Creates a fork point.
    #[must_use]
    pub fn new(archive_url: impl Into<String>, block_number: u64) -> Self {
        Self {
            archive_url: archive_url.into(),
            block_number,
        }
    }

    /// Returns the `hardhat_reset` parameter list.
    #[must_use]
    pub fn reset_params(&self) -> Value {
        json!([{
            "forking": {
                "jsonRpcUrl": self.archive_url,
                "blockNumber": self.block_number,
            }
        }])
    }

    /// Returns the archive URL with everything after the host redacted.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        let (scheme, rest) = self.archive_url.split_once("://").unwrap_or(("", &self.archive_url));
        match rest.split_once('/') {
            Some((host, path)) if !path.is_empty() => format!("{scheme}://{host}/<redacted>"),
            _ => self.archive_url.clone(),
        }
    }
}

impl fmt::Display for ForkPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.redacted_url(), self.block_number)
    }
}

impl fmt::Debug for ForkPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkPoint")
            .field("archive_url", &self.redacted_url())
            .field("block_number", &self.block_number)
            .finish()
    }
}

/// Resets the node onto `point`.
///
/// # Errors
///
/// Returns [`HarnessError::Rpc`] when the node refuses the reset.
pub fn fork_at(rpc: &RpcClient, point: &ForkPoint) -> Result<(), HarnessError> {
    info!(fork = %point, "resetting node onto mainnet fork");
    rpc.hardhat_reset(point)?;
    Ok(())
}
