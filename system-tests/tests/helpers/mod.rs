// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for flash harness system-tests.
// Purpose: Provide logging setup, liquidator launchers, and runner setup.
// Dependencies: system-tests, flash-harness
// ============================================================================

//! ## Overview
//! Shared helpers for flash harness system-tests.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test helpers fail fast on setup errors."
)]

pub mod liquidator;
pub mod logging;
pub mod runner;
