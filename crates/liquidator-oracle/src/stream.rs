// crates/liquidator-oracle/src/stream.rs
// ============================================================================
// Module: Log Stream Parser
// Description: Converts newline-delimited JSON text into ordered log records.
// Purpose: Provide an all-or-nothing parser plus a lazy, restartable iterator.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`LogStream`] borrows captured output and yields [`LogRecord`] values in
//! emission order. Iteration is lazy and can be restarted from the same
//! stream value. The collecting entry points are all-or-nothing: a single
//! malformed line fails the whole parse and no records are returned.
//!
//! Lines end at `\n`; a trailing `\r` is dropped and the final terminator
//! does not produce an extra empty line. Any other empty line is malformed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::str::Lines;

use crate::error::ParseError;
use crate::record::LogRecord;

// ============================================================================
// SECTION: Consumers
// ============================================================================

/// Receives parsed records in emission order.
///
/// This is the narrow boundary between the oracle and whatever launched the
/// liquidator: consumers only ever see records, never processes.
pub trait RecordConsumer {
    /// Observes the next record.
    fn consume(&mut self, record: &LogRecord);
}

impl RecordConsumer for Vec<LogRecord> {
    fn consume(&mut self, record: &LogRecord) {
        self.push(record.clone());
    }
}

// ============================================================================
// SECTION: Log Stream
// ============================================================================

/// Borrowed view over captured JSON-lines output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStream<'a> {
    /// Captured text.
    text: &'a str,
}

impl<'a> LogStream<'a> {
    /// Wraps captured text.
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self {
            text,
        }
    }

    /// Returns a fresh iterator starting at the first line.
    #[must_use]
    pub fn records(&self) -> Records<'a> {
        Records {
            lines: self.text.lines(),
            line: 0,
            failed: false,
        }
    }

    /// Parses every line, failing on the first malformed one.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedLine`] for the first line that is not a
    /// JSON log record.
    pub fn collect_all(&self) -> Result<Vec<LogRecord>, ParseError> {
        self.records().collect()
    }

    /// Validates the whole stream, then feeds every record to `consumer`.
    ///
    /// The consumer sees nothing unless every line parses.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when any line is malformed.
    pub fn feed<C: RecordConsumer + ?Sized>(&self, consumer: &mut C) -> Result<usize, ParseError> {
        let records = self.collect_all()?;
        for record in &records {
            consumer.consume(record);
        }
        Ok(records.len())
    }
}

// ============================================================================
// SECTION: Iterator
// ============================================================================

/// Lazy iterator over the records of a [`LogStream`].
///
/// # Invariants
/// - After yielding an error the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    /// Remaining lines.
    lines: Lines<'a>,
    /// 1-based number of the most recently yielded line.
    line: usize,
    /// Set once a malformed line has been reported.
    failed: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<LogRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let raw = self.lines.next()?;
        self.line += 1;
        let result = parse_line(self.line, raw);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Parses captured text into records, all or nothing.
///
/// # Errors
///
/// Returns [`ParseError`] for the first malformed line.
pub fn parse_records(text: &str) -> Result<Vec<LogRecord>, ParseError> {
    LogStream::new(text).collect_all()
}

/// Reads a UTF-8 stream to the end and parses it, all or nothing.
///
/// # Errors
///
/// Returns [`ParseError::Io`] when reading fails or the bytes are not UTF-8,
/// and [`ParseError::MalformedLine`] for the first malformed line.
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<LogRecord>, ParseError> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|err| ParseError::Io(err.to_string()))?;
    parse_records(&text)
}

/// Parses a single line.
fn parse_line(line: usize, raw: &str) -> Result<LogRecord, ParseError> {
    let content = raw.strip_suffix('\r').unwrap_or(raw);
    if content.trim().is_empty() {
        return Err(ParseError::malformed(line, content, "empty line"));
    }
    serde_json::from_str::<LogRecord>(content)
        .map_err(|err| ParseError::malformed(line, content, err.to_string()))
}
