// crates/flash-harness/src/lib.rs
// ============================================================================
// Module: Flash Harness Library
// Description: Mainnet-fork regression runtime for the flash liquidator.
// Purpose: Fork, deploy, run the liquidator, and judge its output.
// Dependencies: flash-harness-config, liquidator-oracle, reqwest, tracing
// ============================================================================

//! ## Overview
//! The harness drives one regression scenario end to end: it resets a local
//! node onto a historical mainnet block, deploys a fresh flash liquidator,
//! launches the liquidator process against it, and hands the captured
//! JSON-lines output to the oracle. Everything here is blocking and
//! single-threaded apart from the pipe readers of the child process.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod artifacts;
pub mod deploy;
pub mod error;
pub mod fork;
pub mod node;
pub mod process;
pub mod rpc;
pub mod scenario;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use artifacts::RunArtifacts;
pub use artifacts::ScenarioReporter;
pub use deploy::ContractArtifact;
pub use deploy::deploy_contract;
pub use error::HarnessError;
pub use fork::ForkPoint;
pub use fork::fork_at;
pub use node::NodeHandle;
pub use node::ensure_node;
pub use node::wait_for_node_ready;
pub use process::CapturedRun;
pub use process::LiquidatorInvocation;
pub use process::prepare_liquidator_files;
pub use rpc::Receipt;
pub use rpc::RpcClient;
pub use rpc::RpcError;
pub use rpc::Transaction;
pub use rpc::TransactionRequest;
pub use scenario::ReplayOutcome;
pub use scenario::ReplayedTransaction;
pub use scenario::Scenario;
pub use scenario::ScenarioOutcome;
pub use scenario::ScenarioRunner;
