// system-tests/src/scenarios.rs
// ============================================================================
// Module: Scenario Catalog
// Description: Mainnet blocks and expectations of the regression scenarios.
// Purpose: Keep the pinned regression cases in one place.
// Dependencies: liquidator-oracle
// ============================================================================

//! ## Overview
//! The regression scenarios are pinned to mainnet blocks around the ENS
//! liquidation event of December 2021:
//!
//! - at [`ENS_LIQUIDATIONS_BLOCK`] the liquidator must submit exactly three
//!   buy orders, and the only tolerated ERROR is a slippage failure;
//! - buy orders issued at [`GAS_OFFSET_ISSUED_BLOCK`] must still execute when
//!   replayed at [`GAS_OFFSET_EXECUTED_BLOCK`] with their original gas limit.
//!
//! Expectations are also kept as TOML under `fixtures/` so the CLI can load
//! them.

use std::path::PathBuf;

use liquidator_oracle::Level;
use liquidator_oracle::ScenarioExpectation;
use liquidator_oracle::expectation::FAILED_TO_BUY;
use liquidator_oracle::expectation::SUBMITTED_BUY_ORDER;
use liquidator_oracle::expectation::TOO_LITTLE_RECEIVED;

/// Block with three ENS vaults up for auction.
pub const ENS_LIQUIDATIONS_BLOCK: u64 = 13_738_315;
/// Block the gas-offset buy orders are issued at.
pub const GAS_OFFSET_ISSUED_BLOCK: u64 = 13_738_305;
/// Block the gas-offset buy orders are replayed at.
pub const GAS_OFFSET_EXECUTED_BLOCK: u64 = 13_738_315;
/// Buy orders expected at [`ENS_LIQUIDATIONS_BLOCK`].
pub const ENS_BUY_ORDERS: usize = 3;
/// Vault the liquidator must never start an auction for.
pub const EXCLUDED_VAULT: &str = "0x00cbb039b7b8103611a9717f";

/// ENS fixture file name.
pub const ENS_FIXTURE: &str = "ens_13738315.toml";
/// Vault exclusion fixture file name.
pub const VAULT_EXCLUSION_FIXTURE: &str = "vault_exclusion.toml";

/// Expectation at [`ENS_LIQUIDATIONS_BLOCK`].
#[must_use]
pub fn ens_expectation() -> ScenarioExpectation {
    ScenarioExpectation::new()
        .count_at(Level::Info, SUBMITTED_BUY_ORDER, ENS_BUY_ORDERS)
        .allow_error(FAILED_TO_BUY, Some(TOO_LITTLE_RECEIVED))
}

/// ENS expectation plus the vault exclusion.
#[must_use]
pub fn vault_exclusion_expectation() -> ScenarioExpectation {
    ens_expectation().exclude_vault(EXCLUDED_VAULT)
}

/// Returns the path of a fixture file.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}
