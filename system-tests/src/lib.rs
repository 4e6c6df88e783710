// system-tests/src/lib.rs
// ============================================================================
// Module: Flash Harness System Tests Library
// Description: Shared scenario catalog and the scripted liquidator outputs.
// Purpose: Provide common definitions for the system-test binaries.
// Dependencies: flash-harness-config, liquidator-oracle, serde_json
// ============================================================================

//! ## Overview
//! This crate hosts the regression scenario catalog (blocks, expectations,
//! fixture files) and the canned outputs of `scripted-liquidator`, a stand-in
//! for the real liquidator binary that lets the process path run offline.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod scenarios;
pub mod scripted;
