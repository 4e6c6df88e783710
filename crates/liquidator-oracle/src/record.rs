// crates/liquidator-oracle/src/record.rs
// ============================================================================
// Module: Log Records
// Description: Typed model of one JSON log line emitted by the liquidator.
// Purpose: Give assertions typed access to severity and structured fields.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`LogRecord`] mirrors one line of the liquidator's JSON log format: a
//! severity, a flat map of structured fields, and the optional envelope keys
//! (`timestamp`, `target`, `span`, `spans`) the formatter attaches. Records
//! are immutable once parsed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;

use crate::tx_hash::extract_tx_hash;

// ============================================================================
// SECTION: Field Names
// ============================================================================

/// Field carrying the human-readable event message.
pub const MESSAGE_FIELD: &str = "message";
/// Field carrying the debug-formatted submitted transaction.
pub const TX_HASH_FIELD: &str = "tx_hash";
/// Field carrying the debug-formatted vault identifier.
pub const VAULT_ID_FIELD: &str = "vault_id";
/// Field carrying the debug-formatted error detail.
pub const ERROR_FIELD: &str = "error";

// ============================================================================
// SECTION: Level
// ============================================================================

/// Severity of a log record.
///
/// # Invariants
/// - Variants are ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Fine-grained tracing output.
    Trace,
    /// Debug output (emitted when the liquidator runs with a debug filter).
    Debug,
    /// Informational events such as submitted orders.
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures.
    Error,
}

impl Level {
    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Field Values
// ============================================================================

/// Scalar value of a structured log field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// JSON `null`.
    Null,
    /// Boolean field.
    Bool(bool),
    /// Numeric field, kept in its JSON representation.
    Number(Number),
    /// String field (debug-formatted values arrive as strings).
    String(String),
}

impl FieldValue {
    /// Returns the string payload when the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true when the rendered value equals `expected` exactly.
    ///
    /// Strings compare verbatim, other scalars compare by their JSON text.
    #[must_use]
    pub fn matches_text(&self, expected: &str) -> bool {
        match self {
            Self::String(value) => value == expected,
            other => other.to_string() == expected,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// ============================================================================
// SECTION: Log Record
// ============================================================================

/// One parsed line of liquidator JSON log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Record severity.
    pub level: Level,
    /// Structured event fields, including `message`.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Emission timestamp as formatted by the liquidator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Module path of the emitting call site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Innermost active span, if span output was enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Value>,
    /// Full span stack, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Value>,
}

impl LogRecord {
    /// Creates a record with the given level and message and no other fields.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(MESSAGE_FIELD.to_string(), FieldValue::String(message.into()));
        Self {
            level,
            fields,
            timestamp: None,
            target: None,
            span: None,
            spans: Vec::new(),
        }
    }

    /// Adds a structured field, replacing any previous value for the key.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns the event message when it is present and a string.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.field_str(MESSAGE_FIELD)
    }

    /// Returns a field value by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Returns a field value by key when it is a string.
    #[must_use]
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(FieldValue::as_str)
    }

    /// Returns true when the record's message equals `message`.
    #[must_use]
    pub fn has_message(&self, message: &str) -> bool {
        self.message() == Some(message)
    }

    /// Returns true when both level and message match.
    #[must_use]
    pub fn is(&self, level: Level, message: &str) -> bool {
        self.level == level && self.has_message(message)
    }

    /// Extracts the submitted transaction hash from the `tx_hash` field.
    #[must_use]
    pub fn tx_hash(&self) -> Option<&str> {
        self.field_str(TX_HASH_FIELD).and_then(extract_tx_hash)
    }

    /// Renders the record as a single compact JSON line for diagnostics.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!("{} {}", self.level, self.message().unwrap_or_default()))
    }
}
