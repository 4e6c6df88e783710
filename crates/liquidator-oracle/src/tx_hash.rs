// crates/liquidator-oracle/src/tx_hash.rs
// ============================================================================
// Module: Transaction Hash Extraction
// Description: Pulls submitted transaction hashes out of debug-formatted fields.
// Purpose: Let scenarios look up the transactions a liquidator run submitted.
// Dependencies: regex
// ============================================================================

//! ## Overview
//! The liquidator logs the pending transaction handle with debug formatting,
//! so the `tx_hash` field holds text like
//! `PendingTransaction { tx_hash: 0xab.., confirmations: 1, .. }`. Newer
//! builds log the bare hash. Both shapes are accepted.

use std::sync::OnceLock;

use regex::Regex;

/// Pattern locating the hash inside debug-formatted pending transactions.
const EMBEDDED_TX_HASH: &str = r"tx_hash:\s+(\w+)";
/// Pattern matching a bare 32-byte hex hash.
const BARE_TX_HASH: &str = r"^0x[0-9a-fA-F]{64}$";

/// Returns the compiled embedded-hash pattern.
fn embedded_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EMBEDDED_TX_HASH).ok()).as_ref()
}

/// Returns the compiled bare-hash pattern.
fn bare_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(BARE_TX_HASH).ok()).as_ref()
}

/// Extracts a transaction hash from the text of a `tx_hash` log field.
///
/// Returns `None` when the text holds neither an embedded `tx_hash: <hex>`
/// fragment nor a bare `0x`-prefixed 32-byte hash.
#[must_use]
pub fn extract_tx_hash(text: &str) -> Option<&str> {
    if let Some(hash) = embedded_pattern()
        .and_then(|pattern| pattern.captures(text))
        .and_then(|captures| captures.get(1))
    {
        return Some(hash.as_str());
    }
    let trimmed = text.trim().trim_matches('"');
    bare_pattern().filter(|pattern| pattern.is_match(trimmed)).map(|_| trimmed)
}

/// Returns true when `hash` is a `0x`-prefixed 32-byte hex string.
#[must_use]
pub fn is_well_formed_tx_hash(hash: &str) -> bool {
    bare_pattern().is_some_and(|pattern| pattern.is_match(hash))
}
