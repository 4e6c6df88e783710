// crates/flash-harness/src/scenario.rs
// ============================================================================
// Module: Regression Scenarios
// Description: End-to-end scenario runner and buy-order replay.
// Purpose: Fork, deploy, run the liquidator, and judge its output.
// Dependencies: flash-harness-config, liquidator-oracle, serde, tracing
// ============================================================================

//! ## Overview
//! [`ScenarioRunner::run`] executes one scenario against a historical block:
//!
//! 1. reset the node onto the fork point,
//! 2. deploy a fresh flash liquidator from the first node account,
//! 3. record the account balance,
//! 4. write the liquidator's config and key file and run it once,
//! 5. parse the captured stdout and evaluate the expectation,
//! 6. report how much ETH the run spent.
//!
//! [`ScenarioRunner::replay_buy_orders`] checks the gas margin: buy orders
//! issued at one block are replayed, with their original gas limits, on a
//! fork of a later block. A replay that reverts means the liquidator did not
//! leave enough gas headroom.

// ============================================================================
// SECTION: Imports
// ============================================================================

use flash_harness_config::Address;
use flash_harness_config::HarnessConfig;
use flash_harness_config::LiquidatorConfig;
use liquidator_oracle::EvaluationReport;
use liquidator_oracle::Level;
use liquidator_oracle::LogRecord;
use liquidator_oracle::ScenarioExpectation;
use liquidator_oracle::evaluate;
use liquidator_oracle::expectation::SUBMITTED_BUY_ORDER;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::artifacts::RunArtifacts;
use crate::deploy::ContractArtifact;
use crate::deploy::deploy_contract;
use crate::error::HarnessError;
use crate::fork::ForkPoint;
use crate::fork::fork_at;
use crate::process::CapturedRun;
use crate::process::LiquidatorInvocation;
use crate::process::prepare_liquidator_files;
use crate::rpc::RpcClient;
use crate::rpc::TransactionRequest;
use crate::rpc::parse_quantity;

/// Wei per micro-ETH.
const WEI_PER_MICRO_ETH: i128 = 1_000_000_000_000;

// ============================================================================
// SECTION: Scenario Types
// ============================================================================

/// A named regression case pinned to a mainnet block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Scenario name, also the artifact directory name.
    pub name: String,
    /// Mainnet block to fork.
    pub block: u64,
    /// Assertions over the liquidator output.
    pub expectation: ScenarioExpectation,
}

impl Scenario {
    /// Creates a scenario.
    #[must_use]
    pub fn new(name: impl Into<String>, block: u64, expectation: ScenarioExpectation) -> Self {
        Self {
            name: name.into(),
            block,
            expectation,
        }
    }
}

/// Everything one scenario run produced.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub scenario: String,
    /// Fork the run used.
    pub fork: ForkPoint,
    /// Account that deployed and ran the liquidator.
    pub owner: Address,
    /// Deployed flash liquidator.
    pub flash: Address,
    /// Captured process output.
    pub run: CapturedRun,
    /// Parsed log records.
    pub records: Vec<LogRecord>,
    /// Expectation verdicts.
    pub report: EvaluationReport,
    /// Owner balance decrease in micro-ETH (negative when the run profited).
    pub eth_spent_micro: i128,
}

impl ScenarioOutcome {
    /// Returns true when every expectation held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.report.passed()
    }

    /// Fails with the first unmet expectation.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Expectation`] when any predicate failed.
    pub fn ensure_passed(&self) -> Result<(), HarnessError> {
        self.report.clone().into_result()?;
        Ok(())
    }

    /// Returns the hashes of submitted buy orders in emission order.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Replay`] when a buy order record carries no
    /// recognizable transaction hash.
    pub fn buy_order_hashes(&self) -> Result<Vec<String>, HarnessError> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.is(Level::Info, SUBMITTED_BUY_ORDER))
            .map(|(index, record)| {
                record.tx_hash().map(str::to_string).ok_or_else(|| {
                    HarnessError::Replay(format!(
                        "buy order record #{} has no transaction hash",
                        index + 1
                    ))
                })
            })
            .collect()
    }
}

/// One replayed buy order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayedTransaction {
    /// Hash of the transaction the liquidator submitted.
    pub original_hash: String,
    /// Hash of the replay on the later fork.
    pub replay_hash: String,
    /// Gas limit carried over, hex quantity.
    pub gas_limit: String,
    /// Gas the replay consumed, hex quantity.
    pub gas_used: String,
}

/// Result of a buy-order replay.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// The run that issued the buy orders.
    pub issued: ScenarioOutcome,
    /// Block the orders were replayed on.
    pub executed_at: u64,
    /// Replayed transactions in submission order.
    pub replayed: Vec<ReplayedTransaction>,
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Drives scenarios against one node.
#[derive(Debug)]
pub struct ScenarioRunner {
    /// Harness configuration.
    config: HarnessConfig,
    /// Node client.
    rpc: RpcClient,
    /// Resolved archive endpoint.
    archive_url: String,
}

impl ScenarioRunner {
    /// Builds a runner, resolving the archive endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the archive key cannot be read or the
    /// RPC client cannot be built.
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        let archive_url = config.fork.resolve_archive_url()?;
        let rpc = RpcClient::new(&config.node.url, config.node.rpc_timeout())?;
        Ok(Self::with_rpc(config, rpc, archive_url))
    }

    /// Builds a runner over an existing client.
    #[must_use]
    pub const fn with_rpc(config: HarnessConfig, rpc: RpcClient, archive_url: String) -> Self {
        Self {
            config,
            rpc,
            archive_url,
        }
    }

    /// Returns the node client.
    #[must_use]
    pub const fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Returns the fork point for `block`.
    #[must_use]
    pub fn fork_point(&self, block: u64) -> ForkPoint {
        ForkPoint::new(self.archive_url.clone(), block)
    }

    /// Deploys a flash liquidator from the first node account.
    ///
    /// Returns `(owner, flash)`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the node has no accounts or deployment fails.
    pub fn deploy_flash_liquidator(&self) -> Result<(Address, Address), HarnessError> {
        let owner = self
            .rpc
            .accounts()?
            .into_iter()
            .next()
            .ok_or_else(|| HarnessError::Deploy("node exposes no accounts".to_string()))?;
        let artifact = ContractArtifact::load(&self.config.contracts.flash_liquidator_artifact)?;
        let flash = deploy_contract(
            &self.rpc,
            &owner,
            &artifact,
            &self.config.contracts.flash_constructor_args(),
            self.config.node.rpc_timeout(),
        )?;
        Ok((owner, flash))
    }

    /// Runs `scenario` and evaluates its expectation.
    ///
    /// An unmet expectation is reported in the outcome, not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when forking, deployment, the process run, or
    /// parsing of the captured output fails.
    pub fn run(
        &self,
        scenario: &Scenario,
        artifacts: &RunArtifacts,
    ) -> Result<ScenarioOutcome, HarnessError> {
        let fork = self.fork_point(scenario.block);
        fork_at(&self.rpc, &fork)?;
        let (owner, flash) = self.deploy_flash_liquidator()?;
        info!(scenario = scenario.name.as_str(), flash = %flash, "flash liquidator deployed");
        let starting_balance = self.rpc.balance(&owner)?;

        let liquidator_config = LiquidatorConfig::for_deployment(&self.config.contracts, flash.clone());
        let (config_path, key_path) = prepare_liquidator_files(
            &artifacts.liquidator_dir(),
            &liquidator_config,
            &self.config.deployer,
        )?;
        let invocation = LiquidatorInvocation::new(
            &self.config.liquidator,
            &config_path,
            &self.config.node.url,
            self.config.node.chain_id,
            &key_path,
        )?;
        let run = invocation.run(self.config.liquidator.timeout())?;
        artifacts.write_bytes("stdout", &run.stdout)?;
        artifacts.write_bytes("stderr", &run.stderr)?;
        info!(root = %artifacts.root().display(), "liquidator output captured");

        let records = run.records()?;
        let report = evaluate(&scenario.expectation, &records);
        artifacts.write_json("report.json", &report)?;

        let final_balance = self.rpc.balance(&owner)?;
        let eth_spent_micro = micro_eth_spent(starting_balance, final_balance);
        info!(
            scenario = scenario.name.as_str(),
            records = records.len(),
            passed = report.passed(),
            eth_spent_micro,
            "scenario evaluated"
        );
        Ok(ScenarioOutcome {
            scenario: scenario.name.clone(),
            fork,
            owner,
            flash,
            run,
            records,
            report,
            eth_spent_micro,
        })
    }

    /// Issues buy orders at `issued_at`, then replays them on `executed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the issuing run fails its expectation, a
    /// buy order cannot be found, the redeployed liquidator lands on another
    /// address, or any replay reverts.
    pub fn replay_buy_orders(
        &self,
        issuing: &Scenario,
        executed_at: u64,
        artifacts: &RunArtifacts,
    ) -> Result<ReplayOutcome, HarnessError> {
        let issued = self.run(issuing, artifacts)?;
        issued.ensure_passed()?;

        let mut transactions = Vec::new();
        for hash in issued.buy_order_hashes()? {
            let tx = self
                .rpc
                .transaction(&hash)?
                .ok_or_else(|| HarnessError::Replay(format!("transaction {hash} not found")))?;
            info!(tx_hash = tx.hash.as_str(), nonce = tx.nonce.as_str(), "buy order found");
            transactions.push(tx);
        }
        if transactions.is_empty() {
            warn!(block = issuing.block, "no buy orders to replay");
        }

        info!(from = issuing.block, to = executed_at, "rewinding");
        fork_at(&self.rpc, &self.fork_point(executed_at))?;
        let (owner, flash) = self.deploy_flash_liquidator()?;
        if flash != issued.flash {
            return Err(HarnessError::Replay(format!(
                "redeployed flash liquidator at {flash}, orders target {}",
                issued.flash
            )));
        }

        let mut replayed = Vec::with_capacity(transactions.len());
        for tx in transactions {
            if let Some(chain_id) = &tx.chain_id {
                let chain_id = parse_quantity(chain_id)?;
                if chain_id != u128::from(self.config.node.chain_id) {
                    return Err(HarnessError::Replay(format!(
                        "transaction {} was signed for chain {chain_id}",
                        tx.hash
                    )));
                }
            }
            info!(tx_hash = tx.hash.as_str(), gas = tx.gas.as_str(), "replaying");
            let request = TransactionRequest {
                from: Some(owner.clone()),
                to: tx.to.clone(),
                data: Some(tx.input.clone()),
                gas: Some(tx.gas.clone()),
                value: Some(tx.value.clone()),
            };
            let replay_hash = self.rpc.send_transaction(&request)?;
            let receipt = self.rpc.wait_for_receipt(&replay_hash, self.config.node.rpc_timeout())?;
            if !receipt.succeeded() {
                return Err(HarnessError::Replay(format!(
                    "replay of {} reverted with gas limit {} (used {})",
                    tx.hash, tx.gas, receipt.gas_used
                )));
            }
            replayed.push(ReplayedTransaction {
                original_hash: tx.hash,
                replay_hash,
                gas_limit: tx.gas,
                gas_used: receipt.gas_used,
            });
        }
        artifacts.write_json("replay.json", &replayed)?;
        Ok(ReplayOutcome {
            issued,
            executed_at,
            replayed,
        })
    }
}

/// Balance decrease in micro-ETH; negative when the balance grew.
fn micro_eth_spent(starting: u128, ending: u128) -> i128 {
    let starting = i128::try_from(starting).unwrap_or(i128::MAX);
    let ending = i128::try_from(ending).unwrap_or(i128::MAX);
    starting.saturating_sub(ending) / WEI_PER_MICRO_ETH
}
