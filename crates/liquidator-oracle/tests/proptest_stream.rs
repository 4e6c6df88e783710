// crates/liquidator-oracle/tests/proptest_stream.rs
// ============================================================================
// Module: Log Stream Property-Based Tests
// Description: Property tests for parser completeness and evaluator counting.
// Purpose: Detect panics and ordering bugs across wide input ranges.
// ============================================================================

//! Property-based tests for stream parsing and evaluation invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use liquidator_oracle::Level;
use liquidator_oracle::LogRecord;
use liquidator_oracle::LogStream;
use liquidator_oracle::ScenarioExpectation;
use liquidator_oracle::evaluate;
use liquidator_oracle::parse_records;
use proptest::prelude::*;

fn level_strategy() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::Trace),
        Just(Level::Debug),
        Just(Level::Info),
        Just(Level::Warn),
        Just(Level::Error),
    ]
}

fn record_strategy() -> impl Strategy<Value = LogRecord> {
    (level_strategy(), prop_oneof![Just("Submitted buy order".to_string()), ".{0,24}"])
        .prop_map(|(level, message)| LogRecord::new(level, message))
}

fn render(records: &[LogRecord]) -> String {
    records.iter().map(|record| format!("{}\n", record.to_json_line())).collect()
}

proptest! {
    #[test]
    fn rendered_records_parse_back_in_order(records in prop::collection::vec(record_strategy(), 0 .. 32)) {
        let text = render(&records);
        let parsed = parse_records(&text).unwrap();
        prop_assert_eq!(parsed, records);
    }

    #[test]
    fn any_garbage_line_fails_the_whole_stream(
        records in prop::collection::vec(record_strategy(), 1 .. 16),
        position in any::<prop::sample::Index>(),
        garbage in "[^{\\n]{1,16}",
    ) {
        let mut lines: Vec<String> = records.iter().map(LogRecord::to_json_line).collect();
        let at = position.index(lines.len() + 1);
        lines.insert(at, garbage);
        let text = lines.join("\n");
        let error = parse_records(&text).unwrap_err();
        prop_assert_eq!(error.line(), Some(at + 1));
    }

    #[test]
    fn buy_order_count_matches_info_records(records in prop::collection::vec(record_strategy(), 0 .. 32)) {
        let expected = records
            .iter()
            .filter(|record| record.is(Level::Info, "Submitted buy order"))
            .count();
        let report = evaluate(&ScenarioExpectation::new().buy_orders(expected), &records);
        prop_assert!(report.passed());
        let report = evaluate(&ScenarioExpectation::new().buy_orders(expected + 1), &records);
        prop_assert!(!report.passed());
    }

    #[test]
    fn parser_never_panics(text in "\\PC{0,256}") {
        let _ = LogStream::new(&text).records().count();
    }
}
