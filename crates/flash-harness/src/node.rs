// crates/flash-harness/src/node.rs
// ============================================================================
// Module: Forking Node
// Description: Optional node process management and readiness probing.
// Purpose: Ensure the node answers before any scenario touches it.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! The harness either attaches to a node that is already listening or spawns
//! the configured node command. Readiness is checked with `eth_chainId` rather
//! than fixed sleeps, and the reported chain id must match the configuration
//! because the liquidator signs for that chain.

use std::process::Child;
use std::process::Command;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use flash_harness_config::NodeConfig;
use tracing::debug;
use tracing::info;

use crate::error::HarnessError;
use crate::rpc::RpcClient;

/// Delay between readiness checks.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns a spawned node process, if any; the process is killed on drop.
#[derive(Debug)]
pub struct NodeHandle {
    /// Spawned node, absent when attaching to an external node.
    child: Option<Child>,
}

impl NodeHandle {
    /// Handle for a node the harness did not start.
    #[must_use]
    pub const fn external() -> Self {
        Self {
            child: None,
        }
    }

    /// Returns true when the harness spawned the node.
    #[must_use]
    pub const fn is_spawned(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for NodeHandle {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Spawns the configured node (if any) and waits until it is ready.
///
/// # Errors
///
/// Returns [`HarnessError::Node`] when the node cannot be spawned, does not
/// answer in time, or reports an unexpected chain id.
pub fn ensure_node(config: &NodeConfig, rpc: &RpcClient) -> Result<NodeHandle, HarnessError> {
    let handle = match &config.command {
        Some(command) => spawn_node(command)?,
        None => NodeHandle::external(),
    };
    let chain_id = wait_for_node_ready(rpc, config.ready_timeout())?;
    if chain_id != config.chain_id {
        return Err(HarnessError::Node(format!(
            "node reports chain id {chain_id}, expected {}",
            config.chain_id
        )));
    }
    info!(url = rpc.url(), chain_id, spawned = handle.is_spawned(), "node ready");
    Ok(handle)
}

/// Polls `eth_chainId` until the node answers or `timeout` expires.
///
/// # Errors
///
/// Returns [`HarnessError::Node`] when the node never answers.
pub fn wait_for_node_ready(rpc: &RpcClient, timeout: Duration) -> Result<u64, HarnessError> {
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match rpc.chain_id() {
            Ok(chain_id) => return Ok(chain_id),
            Err(err) => {
                if start.elapsed() > timeout {
                    return Err(HarnessError::Node(format!(
                        "node readiness timeout after {attempts} attempts: {err}"
                    )));
                }
                debug!(attempts, error = %err, "node not ready");
                thread::sleep(READY_POLL_INTERVAL);
            }
        }
    }
}

/// Spawns the node command with discarded output.
fn spawn_node(command: &[String]) -> Result<NodeHandle, HarnessError> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| HarnessError::Node("node command is empty".to_string()))?;
    info!(program = program.as_str(), "spawning node");
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| HarnessError::Node(format!("failed to spawn node `{program}`: {err}")))?;
    Ok(NodeHandle {
        child: Some(child),
    })
}
