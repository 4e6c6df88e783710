// crates/liquidator-oracle/src/evaluate.rs
// ============================================================================
// Module: Scenario Assertion Evaluator
// Description: Single-pass evaluation of expectations over log records.
// Purpose: Report pass/fail per predicate with the offending record.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The [`Evaluator`] walks the record sequence exactly once, keeping one
//! small accumulator per predicate, then produces an [`EvaluationReport`].
//! Any failed predicate is fatal to the scenario; the report converts into
//! an [`ExpectationError`] naming the first failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::error::ExpectationError;
use crate::expectation::Presence;
use crate::expectation::ScenarioExpectation;
use crate::record::LogRecord;
use crate::stream::RecordConsumer;

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// A record that caused a predicate to fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offense {
    /// 0-based position of the record in the sequence.
    pub index: usize,
    /// The offending record.
    pub record: LogRecord,
}

/// Result of one predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredicateOutcome {
    /// Human-readable predicate description.
    pub predicate: String,
    /// Whether the predicate held.
    pub passed: bool,
    /// Observed values backing the verdict.
    pub detail: String,
    /// Record that broke the predicate, when a single record is to blame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offense: Option<Offense>,
}

impl PredicateOutcome {
    /// Renders the failure as a single-line detail.
    fn failure_detail(&self) -> String {
        match &self.offense {
            Some(offense) => format!(
                "{} (record #{}: {})",
                self.detail,
                offense.index + 1,
                offense.record.to_json_line()
            ),
            None => self.detail.clone(),
        }
    }
}

/// Outcome of evaluating a full expectation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Number of records observed.
    pub records_seen: usize,
    /// One outcome per predicate, in declaration order.
    pub outcomes: Vec<PredicateOutcome>,
}

impl EvaluationReport {
    /// Returns true when every predicate held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.passed)
    }

    /// Returns the failed predicates.
    pub fn failures(&self) -> impl Iterator<Item = &PredicateOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed)
    }

    /// Converts the report into a result that fails on the first unmet predicate.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectationError::Unmet`] for the first failed predicate.
    pub fn into_result(self) -> Result<Self, ExpectationError> {
        if let Some(failure) = self.failures().next() {
            return Err(ExpectationError::Unmet {
                predicate: failure.predicate.clone(),
                detail: failure.failure_detail(),
            });
        }
        Ok(self)
    }
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Streaming, single-pass evaluator for one [`ScenarioExpectation`].
#[derive(Debug)]
pub struct Evaluator<'e> {
    /// Expectation under evaluation.
    expectation: &'e ScenarioExpectation,
    /// Records observed so far.
    seen: usize,
    /// Matches per count predicate.
    counts: Vec<usize>,
    /// First record exceeding each count.
    count_overflow: Vec<Option<Offense>>,
    /// First unexpected ERROR record.
    unexpected_error: Option<Offense>,
    /// Number of unexpected ERROR records.
    unexpected_errors: usize,
    /// First matching record per presence predicate.
    presence_hits: Vec<Option<Offense>>,
    /// Most recent record.
    last: Option<Offense>,
}

impl<'e> Evaluator<'e> {
    /// Creates an evaluator with empty accumulators.
    #[must_use]
    pub fn new(expectation: &'e ScenarioExpectation) -> Self {
        Self {
            expectation,
            seen: 0,
            counts: vec![0; expectation.counts.len()],
            count_overflow: vec![None; expectation.counts.len()],
            unexpected_error: None,
            unexpected_errors: 0,
            presence_hits: vec![None; expectation.presence.len()],
            last: None,
        }
    }

    /// Observes the next record.
    pub fn observe(&mut self, record: &LogRecord) {
        let index = self.seen;
        self.seen += 1;

        for (slot, count) in self.expectation.counts.iter().enumerate() {
            if count.matches(record) {
                self.counts[slot] += 1;
                if Some(self.counts[slot]) == count.expected.checked_add(1) {
                    self.count_overflow[slot] = Some(offense(index, record));
                }
            }
        }

        if let Some(policy) = &self.expectation.errors {
            if policy.is_unexpected(record) {
                self.unexpected_errors += 1;
                if self.unexpected_error.is_none() {
                    self.unexpected_error = Some(offense(index, record));
                }
            }
        }

        for (slot, presence) in self.expectation.presence.iter().enumerate() {
            if self.presence_hits[slot].is_none() && presence.matches(record) {
                self.presence_hits[slot] = Some(offense(index, record));
            }
        }

        if self.expectation.terminal_message.is_some() {
            self.last = Some(offense(index, record));
        }
    }

    /// Finalizes the pass and builds the report.
    #[must_use]
    pub fn finish(self) -> EvaluationReport {
        let mut outcomes = Vec::with_capacity(self.expectation.predicate_count());

        for ((count, observed), overflow) in
            self.expectation.counts.iter().zip(&self.counts).zip(self.count_overflow)
        {
            outcomes.push(PredicateOutcome {
                predicate: count.to_string(),
                passed: *observed == count.expected,
                detail: format!("observed {observed}, expected {}", count.expected),
                offense: overflow,
            });
        }

        if let Some(policy) = &self.expectation.errors {
            outcomes.push(PredicateOutcome {
                predicate: policy.to_string(),
                passed: self.unexpected_errors == 0,
                detail: format!("{} unexpected ERROR record(s)", self.unexpected_errors),
                offense: self.unexpected_error,
            });
        }

        for (presence, hit) in self.expectation.presence.iter().zip(self.presence_hits) {
            let outcome = match (presence.mode, hit) {
                (Presence::Required, Some(_)) => PredicateOutcome {
                    predicate: presence.to_string(),
                    passed: true,
                    detail: "matching record found".to_string(),
                    offense: None,
                },
                (Presence::Required, None) => PredicateOutcome {
                    predicate: presence.to_string(),
                    passed: false,
                    detail: "no matching record".to_string(),
                    offense: None,
                },
                (Presence::Forbidden, None) => PredicateOutcome {
                    predicate: presence.to_string(),
                    passed: true,
                    detail: "no matching record".to_string(),
                    offense: None,
                },
                (Presence::Forbidden, Some(hit)) => PredicateOutcome {
                    predicate: presence.to_string(),
                    passed: false,
                    detail: "forbidden record present".to_string(),
                    offense: Some(hit),
                },
            };
            outcomes.push(outcome);
        }

        if let Some(expected) = &self.expectation.terminal_message {
            let observed = self.last.as_ref().and_then(|last| last.record.message());
            let passed = observed == Some(expected.as_str());
            outcomes.push(PredicateOutcome {
                predicate: format!("last message == \"{expected}\""),
                passed,
                detail: observed.map_or_else(
                    || "stream is empty or last record has no message".to_string(),
                    |message| format!("last message was \"{message}\""),
                ),
                offense: if passed { None } else { self.last },
            });
        }

        EvaluationReport {
            records_seen: self.seen,
            outcomes,
        }
    }
}

impl RecordConsumer for Evaluator<'_> {
    fn consume(&mut self, record: &LogRecord) {
        self.observe(record);
    }
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Evaluates `expectation` over `records` in one pass.
#[must_use]
pub fn evaluate<'r, I>(expectation: &ScenarioExpectation, records: I) -> EvaluationReport
where
    I: IntoIterator<Item = &'r LogRecord>,
{
    let mut evaluator = Evaluator::new(expectation);
    for record in records {
        evaluator.observe(record);
    }
    evaluator.finish()
}

/// Builds an offense for the record at `index`.
fn offense(index: usize, record: &LogRecord) -> Offense {
    Offense {
        index,
        record: record.clone(),
    }
}
