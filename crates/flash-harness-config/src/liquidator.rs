// crates/flash-harness-config/src/liquidator.rs
// ============================================================================
// Module: Liquidator Configuration File
// Description: JSON contract-address file consumed by the liquidator.
// Purpose: Produce the exact key names the liquidator deserializes.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The liquidator reads its contract addresses from a JSON object keyed by
//! contract name (`Witch`, `Flash`, `Multicall2`, and optionally
//! `BaseToDebtThreshold` and `SwapRouter02`). The harness writes one before
//! every run, pointing `Flash` at the freshly deployed flash liquidator.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::address::Address;
use crate::config::ConfigError;
use crate::config::ContractsConfig;

/// Contract addresses handed to the liquidator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidatorConfig {
    /// Yield v2 Witch.
    #[serde(rename = "Witch")]
    pub witch: Address,
    /// Deployed flash liquidator.
    #[serde(rename = "Flash")]
    pub flash: Address,
    /// Multicall2 aggregator.
    #[serde(rename = "Multicall2")]
    pub multicall2: Address,
    /// Minimum debt per base id, decimal strings.
    #[serde(rename = "BaseToDebtThreshold", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub base_to_debt_threshold: BTreeMap<String, String>,
    /// Uniswap SwapRouter02.
    #[serde(rename = "SwapRouter02", default, skip_serializing_if = "Option::is_none")]
    pub swap_router02: Option<Address>,
}

impl LiquidatorConfig {
    /// Builds the file contents for a run against `flash`.
    #[must_use]
    pub fn for_deployment(contracts: &ContractsConfig, flash: Address) -> Self {
        Self {
            witch: contracts.witch.clone(),
            flash,
            multicall2: contracts.multicall2.clone(),
            base_to_debt_threshold: contracts.base_to_debt_threshold.clone(),
            swap_router02: contracts.swap_router02.clone(),
        }
    }

    /// Renders the file as pretty-printed JSON (two-space indent).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Writes the file to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when rendering or writing fails.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json_pretty()?;
        fs::write(path, content).map_err(|err| ConfigError::Io(err.to_string()))
    }
}
