// crates/flash-harness/src/deploy.rs
// ============================================================================
// Module: Contract Deployment
// Description: Deploys compiled contracts from Hardhat artifacts.
// Purpose: Put a fresh flash liquidator on every fork.
// Dependencies: serde, serde_json, tracing
// ============================================================================

//! ## Overview
//! Hardhat writes one JSON artifact per contract with the creation
//! `bytecode`. Deployment appends the constructor arguments, each an address
//! left-padded to a 32-byte word, sends the creation transaction from an
//! unlocked node account, and waits for the receipt. Only address arguments
//! are supported.

use std::fs;
use std::path::Path;
use std::time::Duration;

use flash_harness_config::Address;
use serde::Deserialize;
use tracing::info;

use crate::error::HarnessError;
use crate::rpc::RpcClient;
use crate::rpc::TransactionRequest;

/// Maximum artifact size in bytes.
const MAX_ARTIFACT_BYTES: usize = 8 * 1024 * 1024;

/// Compiled contract as emitted by Hardhat.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// Contract name, when recorded.
    #[serde(default)]
    pub contract_name: Option<String>,
    /// `0x`-prefixed creation bytecode.
    pub bytecode: String,
}

impl ContractArtifact {
    /// Loads an artifact file.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Deploy`] when the file is missing, too large,
    /// malformed, or carries no bytecode.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let bytes = fs::read(path).map_err(|err| {
            HarnessError::Deploy(format!("cannot read artifact {}: {err}", path.display()))
        })?;
        if bytes.len() > MAX_ARTIFACT_BYTES {
            return Err(HarnessError::Deploy("artifact exceeds size limit".to_string()));
        }
        let artifact: Self = serde_json::from_slice(&bytes)
            .map_err(|err| HarnessError::Deploy(format!("invalid artifact: {err}")))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Returns creation bytecode with `args` appended.
    #[must_use]
    pub fn creation_data(&self, args: &[&Address]) -> String {
        let mut data = self.bytecode.clone();
        for arg in args {
            data.push_str(&arg.abi_word());
        }
        data
    }

    /// Checks the bytecode is non-empty, even-length hex.
    fn validate(&self) -> Result<(), HarnessError> {
        let digits = self.bytecode.strip_prefix("0x").unwrap_or_default();
        if digits.is_empty() {
            return Err(HarnessError::Deploy(
                "artifact has no bytecode (abstract contract or interface?)".to_string(),
            ));
        }
        if digits.len() % 2 != 0 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HarnessError::Deploy("artifact bytecode is not hex".to_string()));
        }
        Ok(())
    }
}

/// Deploys `artifact` from `from` with address constructor arguments.
///
/// # Errors
///
/// Returns [`HarnessError`] when the transaction is rejected, times out,
/// reverts, or yields no contract address.
pub fn deploy_contract(
    rpc: &RpcClient,
    from: &Address,
    artifact: &ContractArtifact,
    args: &[&Address],
    timeout: Duration,
) -> Result<Address, HarnessError> {
    let request = TransactionRequest {
        from: Some(from.clone()),
        data: Some(artifact.creation_data(args)),
        ..TransactionRequest::default()
    };
    let hash = rpc.send_transaction(&request)?;
    let receipt = rpc.wait_for_receipt(&hash, timeout)?;
    if !receipt.succeeded() {
        return Err(HarnessError::Deploy(format!("deployment {hash} reverted")));
    }
    let address = receipt
        .contract_address
        .ok_or_else(|| HarnessError::Deploy(format!("deployment {hash} created no contract")))?;
    info!(
        contract = artifact.contract_name.as_deref().unwrap_or("contract"),
        address = %address,
        tx_hash = hash.as_str(),
        "contract deployed"
    );
    Ok(address)
}
