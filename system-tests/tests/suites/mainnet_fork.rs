// system-tests/tests/suites/mainnet_fork.rs
// ============================================================================
// Module: Mainnet Fork Regressions
// Description: Pinned ENS liquidation scenarios on a forked mainnet.
// Purpose: Check the liquidator against real auction state.
// Dependencies: system-tests, flash-harness
// ============================================================================

//! ## Overview
//! Both tests reset the node to a pinned block, deploy a fresh flash
//! liquidator, and run the real liquidator binary. They need an archive
//! endpoint and take minutes; run them with
//! `cargo test -p system-tests --features mainnet-fork --test mainnet`.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use flash_harness::Scenario;
use flash_harness::rpc::parse_quantity;
use liquidator_oracle::ScenarioExpectation;
use system_tests::scenarios::ENS_BUY_ORDERS;
use system_tests::scenarios::ENS_LIQUIDATIONS_BLOCK;
use system_tests::scenarios::GAS_OFFSET_EXECUTED_BLOCK;
use system_tests::scenarios::GAS_OFFSET_ISSUED_BLOCK;
use system_tests::scenarios::ens_expectation;

use crate::helpers::logging;
use crate::helpers::runner::fork_lock;
use crate::helpers::runner::node_runner;
use crate::helpers::runner::reporter;

#[test]
fn ens_liquidations_buy_three_auctions() {
    logging::init();
    let _fork = fork_lock();
    let mut reporter = reporter("ens_liquidations");
    let (_node, runner) = node_runner();
    let scenario = Scenario::new("ens_liquidations", ENS_LIQUIDATIONS_BLOCK, ens_expectation());

    let outcome = runner.run(&scenario, reporter.artifacts()).unwrap();
    outcome.ensure_passed().unwrap();
    assert_eq!(outcome.buy_order_hashes().unwrap().len(), ENS_BUY_ORDERS);

    reporter
        .finish(
            "passed",
            vec![
                format!("flash liquidator at {}", outcome.flash),
                format!("spent {} micro-ETH", outcome.eth_spent_micro),
            ],
            vec!["stdout".to_string(), "stderr".to_string(), "report.json".to_string()],
        )
        .unwrap();
}

#[test]
fn buy_orders_survive_gas_offset() {
    logging::init();
    let _fork = fork_lock();
    let mut reporter = reporter("gas_offset");
    let (_node, runner) = node_runner();
    let issuing =
        Scenario::new("gas_offset_issue", GAS_OFFSET_ISSUED_BLOCK, ScenarioExpectation::new());

    let outcome = runner
        .replay_buy_orders(&issuing, GAS_OFFSET_EXECUTED_BLOCK, reporter.artifacts())
        .unwrap();
    assert!(!outcome.replayed.is_empty(), "no buy orders were issued at {GAS_OFFSET_ISSUED_BLOCK}");
    for tx in &outcome.replayed {
        let used = parse_quantity(&tx.gas_used).unwrap();
        let limit = parse_quantity(&tx.gas_limit).unwrap();
        assert!(used <= limit, "{} used {used} of {limit}", tx.original_hash);
    }

    reporter
        .finish(
            "passed",
            vec![format!(
                "{} buy orders replayed at {}",
                outcome.replayed.len(),
                outcome.executed_at
            )],
            vec!["stdout".to_string(), "report.json".to_string(), "replay.json".to_string()],
        )
        .unwrap();
}
