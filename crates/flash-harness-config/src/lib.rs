// crates/flash-harness-config/src/lib.rs
// ============================================================================
// Module: Flash Harness Config Library
// Description: Canonical harness config model and validation.
// Purpose: Single source of truth for flash-harness.toml semantics.
// Dependencies: serde, serde_json, toml
// ============================================================================

//! ## Overview
//! `flash-harness-config` defines the configuration the regression harness
//! runs with: where the node lives, where forks come from, how the liquidator
//! is launched, and which mainnet contracts it talks to. Validation is strict
//! and fail-closed. The crate also owns the JSON configuration file the
//! liquidator itself reads.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod address;
pub mod config;
pub mod env;
pub mod liquidator;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use address::Address;
pub use config::*;
pub use env::HarnessEnv;
pub use env::HarnessEnvConfig;
pub use env::read_env_strict;
pub use liquidator::LiquidatorConfig;
