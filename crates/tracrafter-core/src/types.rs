//! Core type definitions for Tracrafter

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Error;

/// Account address (lender, borrower, liquidator or admin)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Parse a `0x`-prefixed 20-byte hex address.
    pub fn parse(addr: &str) -> Result<Self, Error> {
        validate_hex_address(addr)?;
        Ok(Self(addr.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fungible asset identifier (the token contract address)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse a `0x`-prefixed 20-byte hex asset address.
    pub fn parse(id: &str) -> Result<Self, Error> {
        validate_hex_address(id)?;
        Ok(Self(id.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_hex_address(value: &str) -> Result<(), Error> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| Error::Config(format!("Address {value} must start with 0x")))?;
    let bytes = hex::decode(digits)
        .map_err(|e| Error::Config(format!("Address {value} is not valid hex: {e}")))?;
    if bytes.len() != ADDRESS_BYTES {
        return Err(Error::Config(format!(
            "Address {value} has {} bytes, expected {ADDRESS_BYTES}",
            bytes.len()
        )));
    }
    Ok(())
}

const ADDRESS_BYTES: usize = 20;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Constants
pub mod constants {
    /// Denominator for every basis-point value (10_000 = 100%)
    pub const BPS_DENOMINATOR: u64 = 10_000;

    /// 365 days
    pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

    /// Decimal precision of quote-unit values produced by the price feed
    pub const VALUE_DECIMALS: u8 = 8;

    /// Largest decimal exponent accepted for assets and prices
    pub const MAX_DECIMALS: u8 = 36;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse() {
        let addr = Address::parse("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();
        assert_eq!(addr.as_str(), "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

        assert!(Address::parse("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").is_err());
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0xzz b86991c6218b36c1d19d4a2e9eb0ce3606eb4").is_err());
    }

    #[test]
    fn test_asset_id_display() {
        let wbtc = AssetId::parse("0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599").unwrap();
        assert_eq!(
            wbtc.to_string(),
            "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599"
        );
        assert_eq!(AssetId::new("usdc").as_str(), "usdc");
    }
}
