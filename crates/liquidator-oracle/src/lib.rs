// crates/liquidator-oracle/src/lib.rs
// ============================================================================
// Module: Liquidator Oracle Root
// Description: Public API for liquidator log parsing and assertion evaluation.
// Purpose: Wire together records, the stream parser, expectations, and the evaluator.
// Dependencies: crate::{error, evaluate, expectation, record, stream, tx_hash}
// ============================================================================

//! ## Overview
//! The liquidator under test reports everything it does as JSON lines on
//! standard output. This crate is the oracle over that output: it parses the
//! captured text into [`LogRecord`] values and evaluates a declarative
//! [`ScenarioExpectation`] against them in one pass. It knows nothing about
//! how the liquidator was launched.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod error;
pub mod evaluate;
pub mod expectation;
pub mod record;
pub mod stream;
pub mod tx_hash;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ExpectationError;
pub use error::ParseError;
pub use evaluate::EvaluationReport;
pub use evaluate::Evaluator;
pub use evaluate::Offense;
pub use evaluate::PredicateOutcome;
pub use evaluate::evaluate;
pub use expectation::AllowedError;
pub use expectation::CountExpectation;
pub use expectation::ErrorPolicy;
pub use expectation::Presence;
pub use expectation::PresenceExpectation;
pub use expectation::ScenarioExpectation;
pub use expectation::quoted_vault_id;
pub use record::FieldValue;
pub use record::Level;
pub use record::LogRecord;
pub use stream::LogStream;
pub use stream::RecordConsumer;
pub use stream::Records;
pub use stream::parse_records;
pub use stream::read_records;
pub use tx_hash::extract_tx_hash;
