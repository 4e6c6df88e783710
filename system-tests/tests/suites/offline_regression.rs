// system-tests/tests/suites/offline_regression.rs
// ============================================================================
// Module: Offline Regression Tests
// Description: Harness process path against the scripted liquidator.
// Purpose: Check launch, capture, parsing, and evaluation without a node.
// Dependencies: system-tests, flash-harness, liquidator-oracle
// ============================================================================

//! ## Overview
//! Each test launches `scripted-liquidator` with the same command line the
//! harness builds for the real binary, then evaluates the captured stdout
//! against the pinned expectations.

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

use std::time::Duration;

use flash_harness::HarnessError;
use liquidator_oracle::Level;
use liquidator_oracle::ScenarioExpectation;
use liquidator_oracle::evaluate;
use system_tests::scenarios::ENS_BUY_ORDERS;
use system_tests::scenarios::ENS_FIXTURE;
use system_tests::scenarios::VAULT_EXCLUSION_FIXTURE;
use system_tests::scenarios::ens_expectation;
use system_tests::scenarios::fixture_path;
use system_tests::scripted::Script;
use tempfile::TempDir;

use crate::helpers::liquidator::FLASH;
use crate::helpers::liquidator::RUN_TIMEOUT;
use crate::helpers::liquidator::invocation;
use crate::helpers::liquidator::run_script;
use crate::helpers::logging;

fn fixture(name: &str) -> ScenarioExpectation {
    ScenarioExpectation::load(&fixture_path(name)).unwrap()
}

#[test]
fn ens_transcript_meets_fixture() {
    logging::init();
    let dir = TempDir::new().unwrap();
    let run = run_script(dir.path(), Script::Ens, RUN_TIMEOUT).unwrap();
    assert!(run.success, "stderr: {}", run.stderr_text());

    let records = run.records().unwrap();
    assert_eq!(records.len(), 8);
    let startup = &records[0];
    assert!(startup.is(Level::Info, "Starting liquidator"));
    assert_eq!(startup.field_str("flash"), Some(FLASH));
    assert_eq!(startup.field_str("chain_id"), Some("31337"));

    let report = evaluate(&fixture(ENS_FIXTURE), &records);
    assert!(report.passed(), "{report:?}");
    let buys = records.iter().filter_map(|record| record.tx_hash()).count();
    assert_eq!(buys, ENS_BUY_ORDERS);
}

#[test]
fn options_reach_the_liquidator() {
    let dir = TempDir::new().unwrap();
    let run = run_script(dir.path(), Script::Ens, RUN_TIMEOUT).unwrap();
    let records = run.records().unwrap();
    let options = &records[1];
    assert!(options.is(Level::Debug, "Options"));
    assert_eq!(options.field_str("url"), Some("http://127.0.0.1:8545/"));
    assert_eq!(options.field_str("file"), Some("/dev/null"));
    assert_eq!(options.field_str("min_ratio"), Some("default"));
}

#[test]
fn unexpected_error_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let run = run_script(dir.path(), Script::UnexpectedError, RUN_TIMEOUT).unwrap();
    let records = run.records().unwrap();

    let report = evaluate(&ens_expectation(), &records);
    assert!(!report.passed());
    let failure = report.failures().next().unwrap();
    let offense = failure.offense.as_ref().unwrap();
    assert_eq!(offense.index, records.len() - 1);
    assert!(offense.record.field_str("error").unwrap().contains("insufficient funds"));
}

#[test]
fn auction_for_excluded_vault_is_flagged() {
    let dir = TempDir::new().unwrap();
    let run = run_script(dir.path(), Script::ExcludedVault, RUN_TIMEOUT).unwrap();
    let records = run.records().unwrap();

    assert!(evaluate(&fixture(ENS_FIXTURE), &records).passed());
    let report = evaluate(&fixture(VAULT_EXCLUSION_FIXTURE), &records);
    assert!(!report.passed());
    assert_eq!(report.failures().count(), 1);
}

#[test]
fn panic_text_on_stdout_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let run = run_script(dir.path(), Script::Malformed, RUN_TIMEOUT).unwrap();
    assert!(run.success);
    let err = run.records().unwrap_err();
    assert_eq!(err.line(), Some(4));
}

#[test]
fn nonzero_exit_still_yields_records() {
    let dir = TempDir::new().unwrap();
    let run = run_script(dir.path(), Script::Crash, RUN_TIMEOUT).unwrap();
    assert!(!run.success);
    assert_eq!(run.exit_code, Some(101));
    assert!(evaluate(&ens_expectation(), &run.records().unwrap()).passed());
}

#[test]
fn hung_liquidator_times_out() {
    let dir = TempDir::new().unwrap();
    let err = run_script(dir.path(), Script::Hang, Duration::from_millis(500)).unwrap_err();
    assert!(matches!(err, HarnessError::Timeout { .. }), "{err}");
}

#[test]
fn unknown_instance_is_reported_on_stdout() {
    let dir = TempDir::new().unwrap();
    let run = invocation(dir.path(), "no-such-script").run(RUN_TIMEOUT).unwrap();
    assert!(!run.success);
    let records = run.records().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].is(Level::Error, "Startup failed"));
    assert!(records[0].field_str("error").unwrap().contains("no-such-script"));
}
