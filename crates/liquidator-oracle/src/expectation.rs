// crates/liquidator-oracle/src/expectation.rs
// ============================================================================
// Module: Scenario Expectations
// Description: Declarative assertions over a liquidator run's log records.
// Purpose: Describe what a scenario must observe, in code or in TOML files.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! A [`ScenarioExpectation`] is a fixed set of literal predicates: record
//! counts per message, an allow-list for ERROR records, presence or absence
//! of a field value under a message, and an optional terminal message.
//! Expectations are built fluently or loaded from TOML; loading validates
//! fail-closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ExpectationError;
use crate::record::ERROR_FIELD;
use crate::record::Level;
use crate::record::LogRecord;
use crate::record::VAULT_ID_FIELD;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message logged when a buy order transaction is submitted.
pub const SUBMITTED_BUY_ORDER: &str = "Submitted buy order";
/// Message logged when an auction-start transaction is submitted.
pub const SUBMITTED_LIQUIDATION: &str = "Submitted liquidation";
/// Message logged when buying an auction fails.
pub const FAILED_TO_BUY: &str = "Failed to buy";
/// Error detail emitted when the swap would not cover the flash loan.
pub const TOO_LITTLE_RECEIVED: &str = "Too little received";
/// Maximum expectation file size in bytes.
pub const MAX_EXPECTATION_FILE_BYTES: usize = 256 * 1024;
/// Maximum number of predicates per expectation.
pub const MAX_PREDICATES: usize = 256;

// ============================================================================
// SECTION: Predicate Types
// ============================================================================

/// Exactly `expected` records must carry `message` (at `level`, if given).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountExpectation {
    /// Message to count.
    pub message: String,
    /// Optional level filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    /// Required number of matching records.
    pub expected: usize,
}

impl CountExpectation {
    /// Returns true when `record` is counted by this predicate.
    #[must_use]
    pub fn matches(&self, record: &LogRecord) -> bool {
        self.level.is_none_or(|level| record.level == level) && record.has_message(&self.message)
    }
}

impl fmt::Display for CountExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Some(level) => write!(f, "count({level} \"{}\") == {}", self.message, self.expected),
            None => write!(f, "count(\"{}\") == {}", self.message, self.expected),
        }
    }
}

/// An ERROR record that is tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllowedError {
    /// Message the ERROR record must carry exactly.
    pub message: String,
    /// Substring the record's `error` field must contain, if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_contains: Option<String>,
}

impl AllowedError {
    /// Returns true when `record` matches this allowance.
    #[must_use]
    pub fn matches(&self, record: &LogRecord) -> bool {
        if !record.has_message(&self.message) {
            return false;
        }
        self.error_contains.as_deref().is_none_or(|needle| {
            record.field(ERROR_FIELD).is_some_and(|value| value.to_string().contains(needle))
        })
    }
}

/// ERROR records are forbidden unless one allowance matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorPolicy {
    /// Tolerated ERROR records.
    #[serde(default)]
    pub allow: Vec<AllowedError>,
}

impl ErrorPolicy {
    /// Returns true when `record` is an ERROR record no allowance covers.
    #[must_use]
    pub fn is_unexpected(&self, record: &LogRecord) -> bool {
        record.level == Level::Error && !self.allow.iter().any(|allowed| allowed.matches(record))
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.allow.is_empty() {
            f.write_str("no ERROR records")
        } else {
            write!(f, "no ERROR records outside {} allowed pattern(s)", self.allow.len())
        }
    }
}

/// Whether a field value must or must not appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// At least one record under the message must carry the value.
    Required,
    /// No record under the message may carry the value.
    Forbidden,
}

/// Presence or absence of `field == value` among records carrying `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresenceExpectation {
    /// Message category to inspect.
    pub message: String,
    /// Field name to compare.
    pub field: String,
    /// Exact rendered field value.
    pub value: String,
    /// Required or forbidden.
    pub mode: Presence,
}

impl PresenceExpectation {
    /// Returns true when `record` carries the message and the field value.
    #[must_use]
    pub fn matches(&self, record: &LogRecord) -> bool {
        record.has_message(&self.message)
            && record.field(&self.field).is_some_and(|value| value.matches_text(&self.value))
    }
}

impl fmt::Display for PresenceExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.mode {
            Presence::Required => "has",
            Presence::Forbidden => "never has",
        };
        write!(f, "\"{}\" {verb} {} = {}", self.message, self.field, self.value)
    }
}

// ============================================================================
// SECTION: Scenario Expectation
// ============================================================================

/// Declarative assertions for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioExpectation {
    /// Exact record counts.
    #[serde(default, rename = "count", skip_serializing_if = "Vec::is_empty")]
    pub counts: Vec<CountExpectation>,
    /// ERROR record policy; unchecked when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorPolicy>,
    /// Field presence and absence checks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presence: Vec<PresenceExpectation>,
    /// Message the final record must carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_message: Option<String>,
}

impl ScenarioExpectation {
    /// Creates an expectation with no predicates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires exactly `expected` records carrying `message` at any level.
    #[must_use]
    pub fn count(mut self, message: impl Into<String>, expected: usize) -> Self {
        self.counts.push(CountExpectation {
            message: message.into(),
            level: None,
            expected,
        });
        self
    }

    /// Requires exactly `expected` records carrying `message` at `level`.
    #[must_use]
    pub fn count_at(mut self, level: Level, message: impl Into<String>, expected: usize) -> Self {
        self.counts.push(CountExpectation {
            message: message.into(),
            level: Some(level),
            expected,
        });
        self
    }

    /// Requires exactly `expected` INFO `Submitted buy order` records.
    #[must_use]
    pub fn buy_orders(self, expected: usize) -> Self {
        self.count_at(Level::Info, SUBMITTED_BUY_ORDER, expected)
    }

    /// Forbids ERROR records not covered by an allowance.
    #[must_use]
    pub fn forbid_unexpected_errors(mut self) -> Self {
        self.errors.get_or_insert_with(ErrorPolicy::default);
        self
    }

    /// Tolerates ERROR records carrying `message` (and `error_contains`).
    ///
    /// Enables the ERROR policy if it was not enabled yet.
    #[must_use]
    pub fn allow_error(
        mut self,
        message: impl Into<String>,
        error_contains: Option<&str>,
    ) -> Self {
        self.errors.get_or_insert_with(ErrorPolicy::default).allow.push(AllowedError {
            message: message.into(),
            error_contains: error_contains.map(str::to_string),
        });
        self
    }

    /// Requires some `message` record with `field == value`.
    #[must_use]
    pub fn require_field(
        mut self,
        message: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.presence.push(PresenceExpectation {
            message: message.into(),
            field: field.into(),
            value: value.into(),
            mode: Presence::Required,
        });
        self
    }

    /// Forbids any `message` record with `field == value`.
    #[must_use]
    pub fn forbid_field(
        mut self,
        message: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.presence.push(PresenceExpectation {
            message: message.into(),
            field: field.into(),
            value: value.into(),
            mode: Presence::Forbidden,
        });
        self
    }

    /// Forbids an auction from being started for the vault with hex id `vault_hex`.
    #[must_use]
    pub fn exclude_vault(self, vault_hex: &str) -> Self {
        self.forbid_field(SUBMITTED_LIQUIDATION, VAULT_ID_FIELD, quoted_vault_id(vault_hex))
    }

    /// Requires the final record to carry `message`.
    #[must_use]
    pub fn terminal_message(mut self, message: impl Into<String>) -> Self {
        self.terminal_message = Some(message.into());
        self
    }

    /// Returns the number of predicates this expectation evaluates.
    #[must_use]
    pub fn predicate_count(&self) -> usize {
        self.counts.len()
            + self.presence.len()
            + usize::from(self.errors.is_some())
            + usize::from(self.terminal_message.is_some())
    }

    /// Checks the expectation for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectationError::Invalid`] for empty messages or field
    /// names, or when the predicate limit is exceeded.
    pub fn validate(&self) -> Result<(), ExpectationError> {
        if self.predicate_count() > MAX_PREDICATES {
            return Err(ExpectationError::Invalid(format!(
                "expectation declares more than {MAX_PREDICATES} predicates"
            )));
        }
        for count in &self.counts {
            require_non_empty("count.message", &count.message)?;
        }
        if let Some(errors) = &self.errors {
            for allowed in &errors.allow {
                require_non_empty("errors.allow.message", &allowed.message)?;
                if let Some(needle) = &allowed.error_contains {
                    require_non_empty("errors.allow.error_contains", needle)?;
                }
            }
        }
        for presence in &self.presence {
            require_non_empty("presence.message", &presence.message)?;
            require_non_empty("presence.field", &presence.field)?;
        }
        if let Some(message) = &self.terminal_message {
            require_non_empty("terminal_message", message)?;
        }
        Ok(())
    }

    /// Parses and validates an expectation from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectationError::Parse`] for malformed TOML and
    /// [`ExpectationError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ExpectationError> {
        let expectation: Self =
            toml::from_str(content).map_err(|err| ExpectationError::Parse(err.to_string()))?;
        expectation.validate()?;
        Ok(expectation)
    }

    /// Loads and validates an expectation file.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectationError`] when the file cannot be read, exceeds the
    /// size limit, is not UTF-8, or fails to parse or validate.
    pub fn load(path: &Path) -> Result<Self, ExpectationError> {
        let bytes = fs::read(path).map_err(|err| ExpectationError::Io(err.to_string()))?;
        if bytes.len() > MAX_EXPECTATION_FILE_BYTES {
            return Err(ExpectationError::Invalid(
                "expectation file exceeds size limit".to_string(),
            ));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ExpectationError::Invalid("expectation file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders a vault id the way the liquidator logs it (debug-formatted hex string).
#[must_use]
pub fn quoted_vault_id(vault_hex: &str) -> String {
    let bare = vault_hex.trim().trim_matches('"');
    let bare = bare.strip_prefix("0x").unwrap_or(bare);
    format!("\"{}\"", bare.to_ascii_lowercase())
}

/// Rejects empty or whitespace-only values.
fn require_non_empty(field: &str, value: &str) -> Result<(), ExpectationError> {
    if value.trim().is_empty() {
        return Err(ExpectationError::Invalid(format!("{field} must be non-empty")));
    }
    Ok(())
}
