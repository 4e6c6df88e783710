// crates/liquidator-oracle/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and log-line fixtures for oracle tests.
// ============================================================================
//! ## Overview
//! Shared test helpers for consistent Result-based assertions and for
//! building liquidator JSON log lines the way its formatter emits them.

#![allow(
    dead_code,
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

use std::error::Error;
use std::fmt;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across oracle integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

// ========================================================================
// Log Line Fixtures
// ========================================================================

/// Target the liquidator logs auction activity under.
pub const LIQUIDATIONS_TARGET: &str = "yield_liquidator::liquidations";

/// Builds one JSON log line with the given level, message, and extra fields.
pub fn line(level: &str, message: &str, extra: &[(&str, &str)]) -> String {
    let mut fields = Map::new();
    fields.insert("message".to_string(), Value::String(message.to_string()));
    for (key, value) in extra {
        fields.insert((*key).to_string(), Value::String((*value).to_string()));
    }
    json!({
        "timestamp": "2021-12-04T21:05:13.123456Z",
        "level": level,
        "fields": fields,
        "target": LIQUIDATIONS_TARGET,
    })
    .to_string()
}

/// Debug-formatted vault id as the liquidator logs it.
pub fn vault(hex: &str) -> String {
    format!("\"{hex}\"")
}

/// Debug-formatted pending transaction as the liquidator logs it.
pub fn pending_tx(hash: &str) -> String {
    format!("PendingTransaction {{ tx_hash: {hash}, confirmations: 1, state: PendingTxHash }}")
}

/// Returns a 32-byte hex hash whose last byte is `seed`.
pub fn hash(seed: u8) -> String {
    format!("0x{}{seed:02x}", "ab".repeat(31))
}

/// A `Submitted buy order` INFO line.
pub fn buy_order(seed: u8, vault_hex: &str) -> String {
    line(
        "INFO",
        "Submitted buy order",
        &[("tx_hash", &pending_tx(&hash(seed))), ("vault_id", &vault(vault_hex))],
    )
}

/// A `Submitted liquidation` INFO line.
pub fn liquidation(seed: u8, vault_hex: &str) -> String {
    line(
        "INFO",
        "Submitted liquidation",
        &[("tx_hash", &pending_tx(&hash(seed))), ("vault_id", &vault(vault_hex))],
    )
}

/// A `Failed to buy` ERROR line with the given error detail.
pub fn failed_to_buy(vault_hex: &str, error: &str) -> String {
    line("ERROR", "Failed to buy", &[("vault_id", &vault(vault_hex)), ("error", error)])
}

/// Joins lines into captured stdout text with a trailing newline.
pub fn captured(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
