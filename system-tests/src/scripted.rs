// system-tests/src/scripted.rs
// ============================================================================
// Module: Scripted Liquidator Outputs
// Description: Canned JSON-line transcripts for the stand-in liquidator.
// Purpose: Drive the harness process path without a node or a real liquidator.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! `scripted-liquidator` accepts the real liquidator's command line and
//! replays one of the [`Script`] transcripts below, selected through
//! `--instance-name`. The transcripts use the liquidator's JSON formatter
//! layout (`timestamp`, `level`, `fields`, `target`).

use std::fmt;
use std::str::FromStr;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::scenarios::EXCLUDED_VAULT;

/// Target the liquidator logs auction activity under.
const LIQUIDATIONS_TARGET: &str = "yield_liquidator::liquidations";
/// Target of startup records.
const STARTUP_TARGET: &str = "liquidator";
/// Timestamp stamped on every scripted record.
const TIMESTAMP: &str = "2021-12-04T21:05:13.000000Z";

/// Canned transcript selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Three buy orders and one slippage failure.
    Ens,
    /// [`Script::Ens`] plus an ERROR that is not tolerated.
    UnexpectedError,
    /// [`Script::Ens`] plus an auction for the excluded vault.
    ExcludedVault,
    /// A valid record followed by a panic message on stdout.
    Malformed,
    /// [`Script::Ens`] followed by a nonzero exit.
    Crash,
    /// Startup record, then never exits.
    Hang,
}

impl Script {
    /// Returns the `--instance-name` value selecting this script.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ens => "ens",
            Self::UnexpectedError => "unexpected-error",
            Self::ExcludedVault => "excluded-vault",
            Self::Malformed => "malformed",
            Self::Crash => "crash",
            Self::Hang => "hang",
        }
    }

    /// Returns the exit code the script ends with.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Crash => 101,
            _ => 0,
        }
    }

    /// Returns the stdout lines after the startup record.
    #[must_use]
    pub fn transcript(self) -> Vec<String> {
        match self {
            Self::Ens | Self::Crash => ens_lines(),
            Self::UnexpectedError => {
                let mut lines = ens_lines();
                lines.push(record(
                    "ERROR",
                    LIQUIDATIONS_TARGET,
                    "Failed to buy",
                    &[
                        ("vault_id", vault(VAULTS[1])),
                        ("error", "insufficient funds for gas * price + value".to_string()),
                    ],
                ));
                lines
            }
            Self::ExcludedVault => {
                let mut lines = ens_lines();
                lines.push(record(
                    "INFO",
                    LIQUIDATIONS_TARGET,
                    "Submitted liquidation",
                    &[("tx_hash", pending_tx(9)), ("vault_id", vault(EXCLUDED_VAULT))],
                ));
                lines
            }
            Self::Malformed => vec![
                buy_order(1, VAULTS[0]),
                "thread 'main' panicked at 'called `Result::unwrap()` on an `Err` value'"
                    .to_string(),
            ],
            Self::Hang => Vec::new(),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for unknown script names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown script `{0}`")]
pub struct UnknownScript(pub String);

impl FromStr for Script {
    type Err = UnknownScript;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [
            Self::Ens,
            Self::UnexpectedError,
            Self::ExcludedVault,
            Self::Malformed,
            Self::Crash,
            Self::Hang,
        ]
        .into_iter()
        .find(|script| script.as_str() == value)
        .ok_or_else(|| UnknownScript(value.to_string()))
    }
}

// ============================================================================
// SECTION: Record Builders
// ============================================================================

/// Vaults the ENS transcript buys from.
const VAULTS: [&str; 3] =
    ["0x1c8ab3ba9cd0d0ee36c8e2a0", "0x7a5a2b3d8d2f74e0b4f5e1a2", "0xe39b8c86be4f9f7a1f1c3b44"];

/// Builds one JSON log line.
#[must_use]
pub fn record(level: &str, target: &str, message: &str, extra: &[(&str, String)]) -> String {
    let mut fields = Map::new();
    fields.insert("message".to_string(), Value::String(message.to_string()));
    for (key, value) in extra {
        fields.insert((*key).to_string(), Value::String(value.clone()));
    }
    json!({
        "timestamp": TIMESTAMP,
        "level": level,
        "fields": fields,
        "target": target,
    })
    .to_string()
}

/// The startup record; echoes what the harness handed over.
#[must_use]
pub fn startup(flash: &str, chain_id: u64, gas_boost: u16, rust_log: &str) -> String {
    record(
        "INFO",
        STARTUP_TARGET,
        "Starting liquidator",
        &[
            ("flash", flash.to_string()),
            ("chain_id", chain_id.to_string()),
            ("gas_boost", gas_boost.to_string()),
            ("rust_log", rust_log.to_string()),
        ],
    )
}

/// Returns the hash of scripted transaction `seed`.
#[must_use]
pub fn tx_hash(seed: u8) -> String {
    format!("0x{}{seed:02x}", "5e".repeat(31))
}

/// Debug-formatted pending transaction.
fn pending_tx(seed: u8) -> String {
    format!(
        "PendingTransaction {{ tx_hash: {}, confirmations: 1, state: PendingTxHash }}",
        tx_hash(seed)
    )
}

/// Debug-formatted vault id.
fn vault(hex: &str) -> String {
    format!("\"{}\"", hex.trim_start_matches("0x"))
}

/// A `Submitted buy order` record.
fn buy_order(seed: u8, vault_hex: &str) -> String {
    record(
        "INFO",
        LIQUIDATIONS_TARGET,
        "Submitted buy order",
        &[("tx_hash", pending_tx(seed)), ("vault_id", vault(vault_hex))],
    )
}

/// The ENS block transcript.
fn ens_lines() -> Vec<String> {
    vec![
        record("DEBUG", LIQUIDATIONS_TARGET, "New auctions", &[("count", "3".to_string())]),
        buy_order(1, VAULTS[0]),
        record(
            "ERROR",
            LIQUIDATIONS_TARGET,
            "Failed to buy",
            &[
                ("vault_id", vault(VAULTS[1])),
                ("error", "execution reverted: Too little received".to_string()),
            ],
        ),
        buy_order(2, VAULTS[1]),
        record("WARN", LIQUIDATIONS_TARGET, "Gas price bumped", &[("bump", "10%".to_string())]),
        buy_order(3, VAULTS[2]),
    ]
}
