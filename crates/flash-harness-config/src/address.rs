// crates/flash-harness-config/src/address.rs
// ============================================================================
// Module: Addresses
// Description: Validated 20-byte account and contract addresses.
// Purpose: Reject malformed addresses at config load instead of at the node.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! An [`Address`] is `0x` followed by exactly 40 hex digits. The original
//! spelling is kept so checksummed addresses round-trip unchanged; equality
//! ignores case.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Number of hex digits in an address.
const ADDRESS_HEX_DIGITS: usize = 40;

/// Error returned for malformed addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address `{0}`: expected 0x followed by 40 hex digits")]
pub struct InvalidAddress(pub String);

/// A 20-byte address in `0x`-prefixed hex form.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Wraps a compile-time literal already in `0x` + 40 hex form.
    pub(crate) fn from_literal(value: &'static str) -> Self {
        Self(value.to_string())
    }

    /// Returns the address text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the 40 hex digits without prefix.
    #[must_use]
    pub fn hex_digits(&self) -> &str {
        &self.0[2 ..]
    }

    /// Returns the address left-padded to one 32-byte ABI word (64 hex digits).
    #[must_use]
    pub fn abi_word(&self) -> String {
        format!("{:0>64}", self.hex_digits().to_ascii_lowercase())
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = InvalidAddress;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| InvalidAddress(value.to_string()))?;
        if digits.len() != ADDRESS_HEX_DIGITS || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidAddress(value.to_string()));
        }
        Ok(Self(format!("0x{digits}")))
    }
}

impl TryFrom<String> for Address {
    type Error = InvalidAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::Address;

    #[test]
    fn checksummed_address_round_trips() {
        let address: Address = "0x53C3760670f6091E1eC76B4dd27f73ba4CAd5061".parse().unwrap();
        assert_eq!(address.as_str(), "0x53C3760670f6091E1eC76B4dd27f73ba4CAd5061");
        let lower: Address = "0x53c3760670f6091e1ec76b4dd27f73ba4cad5061".parse().unwrap();
        assert_eq!(address, lower);
    }

    #[test]
    fn abi_word_is_left_padded() {
        let address: Address = "0x1F98431c8aD98523631AE4a59f267346ea31F984".parse().unwrap();
        let word = address.abi_word();
        assert_eq!(word.len(), 64);
        assert!(word.starts_with("000000000000000000000000"));
        assert!(word.ends_with("1f98431c8ad98523631ae4a59f267346ea31f984"));
    }

    #[test]
    fn builtin_literals_are_well_formed() {
        let defaults = crate::ContractsConfig::default();
        for address in [
            &defaults.witch,
            &defaults.multicall2,
            &defaults.uniswap_factory,
            &defaults.uniswap_router,
        ] {
            assert!(address.as_str().parse::<Address>().is_ok(), "{address}");
        }
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        assert!("53C3760670f6091E1eC76B4dd27f73ba4CAd5061".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xZZC3760670f6091E1eC76B4dd27f73ba4CAd5061".parse::<Address>().is_err());
    }
}
