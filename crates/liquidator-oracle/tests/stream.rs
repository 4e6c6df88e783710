// crates/liquidator-oracle/tests/stream.rs
// ============================================================================
// Module: Log Stream Parser Tests
// Description: Coverage for line splitting, ordering, and fail-closed parsing.
// Purpose: Ensure captured liquidator output parses completely or not at all.
// ============================================================================
//! ## Overview
//! Integration tests for [`LogStream`] and the collecting entry points.

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

mod support;

use liquidator_oracle::FieldValue;
use liquidator_oracle::Level;
use liquidator_oracle::LogRecord;
use liquidator_oracle::LogStream;
use liquidator_oracle::ParseError;
use liquidator_oracle::parse_records;
use liquidator_oracle::read_records;
use support::TestResult;
use support::buy_order;
use support::captured;
use support::ensure;
use support::line;

#[test]
fn well_formed_lines_parse_in_order() -> TestResult {
    let text = captured(&[
        line("INFO", "Starting Yield-v2 Liquidator.", &[]),
        line("DEBUG", "checking for undercollateralized positions...", &[]),
        buy_order(1, "1b5a0ba36e4d1bbe1e6e40d9"),
        line("WARN", "Failed to get auction", &[]),
    ]);
    let records = parse_records(&text)?;
    ensure(records.len() == 4, "expected one record per line")?;
    let levels: Vec<Level> = records.iter().map(|record| record.level).collect();
    ensure(
        levels == vec![Level::Info, Level::Debug, Level::Info, Level::Warn],
        "records must keep emission order",
    )?;
    ensure(records[2].has_message("Submitted buy order"), "third record is the buy order")?;
    Ok(())
}

#[test]
fn trailing_terminator_does_not_add_a_line() -> TestResult {
    let text = format!("{}\n", line("INFO", "New block", &[]));
    ensure(parse_records(&text)?.len() == 1, "trailing newline is a terminator")?;
    Ok(())
}

#[test]
fn crlf_line_endings_are_accepted() -> TestResult {
    let text = format!("{}\r\n{}\r\n", line("INFO", "a", &[]), line("INFO", "b", &[]));
    let records = parse_records(&text)?;
    ensure(records.len() == 2, "CRLF lines parse")?;
    ensure(records[1].has_message("b"), "second record message")?;
    Ok(())
}

#[test]
fn empty_input_yields_no_records() -> TestResult {
    ensure(parse_records("")?.is_empty(), "empty stdout is an empty stream")?;
    Ok(())
}

#[test]
fn malformed_line_fails_whole_parse() -> TestResult {
    let text = captured(&[
        line("INFO", "Starting Yield-v2 Liquidator.", &[]),
        "thread 'main' panicked at 'boom'".to_string(),
        buy_order(1, "1b5a0ba36e4d1bbe1e6e40d9"),
    ]);
    match parse_records(&text) {
        Err(error) => {
            ensure(error.line() == Some(2), "error must name line 2")?;
            ensure(error.to_string().contains("panicked"), "error must quote the line")?;
        }
        Ok(records) => {
            return Err(format!("expected failure, got {} records", records.len()).into());
        }
    }
    Ok(())
}

#[test]
fn blank_line_in_the_middle_is_malformed() -> TestResult {
    let text = format!("{}\n\n{}\n", line("INFO", "a", &[]), line("INFO", "b", &[]));
    let error = parse_records(&text).err().ok_or("blank line must fail")?;
    ensure(error.line() == Some(2), "blank line is line 2")?;
    Ok(())
}

#[test]
fn non_object_and_unknown_level_are_malformed() -> TestResult {
    ensure(parse_records("42\n").is_err(), "a bare number is not a record")?;
    ensure(
        parse_records(r#"{"level":"FATAL","fields":{"message":"x"}}"#).is_err(),
        "unknown level is rejected",
    )?;
    ensure(
        parse_records(r#"{"fields":{"message":"x"}}"#).is_err(),
        "missing level is rejected",
    )?;
    Ok(())
}

#[test]
fn level_labels_are_case_sensitive() -> TestResult {
    for label in ["info", "Info", " INFO"] {
        let text = format!(r#"{{"level":"{label}","fields":{{"message":"x"}}}}"#);
        let error = parse_records(&text).err().ok_or("non-canonical level must fail")?;
        ensure(error.line() == Some(1), "level error points at line 1")?;
    }
    Ok(())
}

#[test]
fn iterator_is_lazy_restartable_and_fused() -> TestResult {
    let text = captured(&[line("INFO", "a", &[]), "{".to_string(), line("INFO", "c", &[])]);
    let stream = LogStream::new(&text);

    let mut first = stream.records();
    ensure(first.next().is_some_and(|item| item.is_ok()), "first line parses")?;
    ensure(first.next().is_some_and(|item| item.is_err()), "second line fails")?;
    ensure(first.next().is_none(), "iterator stops after an error")?;

    let mut second = stream.records();
    let again = second.next().ok_or("restart yields the first line")??;
    ensure(again.has_message("a"), "restart begins at line 1")?;
    Ok(())
}

#[test]
fn feed_reaches_consumer_only_on_success() -> TestResult {
    let good = captured(&[line("INFO", "a", &[]), line("INFO", "b", &[])]);
    let mut sink: Vec<LogRecord> = Vec::new();
    let fed = LogStream::new(&good).feed(&mut sink)?;
    ensure(fed == 2 && sink.len() == 2, "all records fed")?;

    let bad = captured(&[line("INFO", "a", &[]), "not json".to_string()]);
    let mut sink: Vec<LogRecord> = Vec::new();
    ensure(LogStream::new(&bad).feed(&mut sink).is_err(), "feed fails on malformed input")?;
    ensure(sink.is_empty(), "consumer sees nothing from a failed stream")?;
    Ok(())
}

#[test]
fn read_records_rejects_invalid_utf8() -> TestResult {
    let bytes: &[u8] = &[0xff, 0xfe, b'\n'];
    match read_records(bytes) {
        Err(ParseError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}").into()),
    }
}

#[test]
fn envelope_and_scalar_fields_are_retained() -> TestResult {
    let text = r#"{"timestamp":"Dec 04 21:05:13.123","level":"INFO","fields":{"message":"confirmed","gas_used":"354216","block_number":13738315,"success":true,"note":null},"target":"yield_liquidator::liquidations","span":{"name":"buying"},"spans":[{"name":"run"},{"name":"buying"}]}"#;
    let records = parse_records(text)?;
    let record = records.first().ok_or("one record expected")?;
    ensure(record.target.as_deref() == Some("yield_liquidator::liquidations"), "target kept")?;
    ensure(record.spans.len() == 2, "span list kept")?;
    ensure(
        record.field("block_number") == Some(&FieldValue::from(13_738_315_u64)),
        "numeric field kept",
    )?;
    ensure(record.field("success") == Some(&FieldValue::Bool(true)), "bool field kept")?;
    ensure(record.field("note") == Some(&FieldValue::Null), "null field kept")?;
    Ok(())
}
