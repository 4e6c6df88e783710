// crates/liquidator-oracle/src/error.rs
// ============================================================================
// Module: Oracle Errors
// Description: Parse and expectation failures raised by the log oracle.
// Purpose: Carry enough context to point at the offending line or record.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every oracle failure is fatal to the scenario that triggered it. Errors
//! therefore carry the line number or predicate description needed to
//! diagnose the run without re-executing it.

use thiserror::Error;

/// Maximum number of characters of an offending line kept in an error.
pub const MAX_EXCERPT_CHARS: usize = 240;

// ============================================================================
// SECTION: Parse Errors
// ============================================================================

/// Failure to turn captured log text into records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line is not a well-formed JSON log record.
    #[error("log line {line} is not a valid record: {reason} (line: {excerpt})")]
    MalformedLine {
        /// 1-based line number within the stream.
        line: usize,
        /// Leading portion of the offending line.
        excerpt: String,
        /// Decoder diagnostic.
        reason: String,
    },
    /// The underlying reader failed.
    #[error("log stream read failed: {0}")]
    Io(String),
}

impl ParseError {
    /// Builds a malformed-line error, truncating the excerpt.
    #[must_use]
    pub fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line,
            excerpt: excerpt(content),
            reason: reason.into(),
        }
    }

    /// Returns the offending 1-based line number, if any.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedLine {
                line, ..
            } => Some(*line),
            Self::Io(_) => None,
        }
    }
}

/// Truncates `content` to [`MAX_EXCERPT_CHARS`] characters.
fn excerpt(content: &str) -> String {
    match content.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &content[.. cut]),
        None => content.to_string(),
    }
}

// ============================================================================
// SECTION: Expectation Errors
// ============================================================================

/// Failure to load, validate, or satisfy a scenario expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpectationError {
    /// A predicate was not satisfied by the record sequence.
    #[error("expectation `{predicate}` failed: {detail}")]
    Unmet {
        /// Description of the failed predicate.
        predicate: String,
        /// Failure detail, including the offending record when known.
        detail: String,
    },
    /// The expectation itself is malformed.
    #[error("invalid expectation: {0}")]
    Invalid(String),
    /// The expectation file could not be read.
    #[error("expectation io error: {0}")]
    Io(String),
    /// The expectation file could not be decoded.
    #[error("expectation parse error: {0}")]
    Parse(String),
}
