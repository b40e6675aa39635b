//! Configuration types for Tracrafter

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{BPS_DENOMINATOR, MAX_DECIMALS};
use crate::{Address, AssetId, Error, Result};

/// One side of the pool's asset pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Token contract address
    pub id: AssetId,

    /// Human-readable symbol ("WBTC", "USDC", ...)
    pub symbol: String,

    /// Token decimals (8 for WBTC, 6 for USDC, 18 for WETH)
    pub decimals: u8,
}

/// Utilization-keyed interest-rate curve. All rates are annual, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum InterestRateConfig {
    /// Constant borrow rate regardless of utilization
    Fixed { annual_rate_bps: u64 },

    /// Piecewise-linear curve with a kink at `optimal_utilization_bps`
    Kinked {
        base_rate_bps: u64,
        slope1_bps: u64,
        slope2_bps: u64,
        optimal_utilization_bps: u64,
    },
}

impl Default for InterestRateConfig {
    fn default() -> Self {
        Self::Kinked {
            base_rate_bps: 200,
            slope1_bps: 400,
            slope2_bps: 6_000,
            optimal_utilization_bps: 8_000,
        }
    }
}

/// Parameters of a single lending pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub collateral: AssetConfig,
    pub borrow: AssetConfig,

    /// Share of collateral value that may be borrowed against, e.g. 8000 = 80%
    #[serde(default = "default_liquidation_threshold_bps")]
    pub liquidation_threshold_bps: u64,

    /// Extra collateral paid to liquidators, e.g. 500 = 5%
    #[serde(default = "default_liquidation_bonus_bps")]
    pub liquidation_bonus_bps: u64,

    /// Oldest accepted price reading, in seconds
    #[serde(default = "default_max_price_age_secs")]
    pub max_price_age_secs: u64,

    #[serde(default)]
    pub interest_rate: InterestRateConfig,
}

fn default_liquidation_threshold_bps() -> u64 {
    8_000
}

fn default_liquidation_bonus_bps() -> u64 {
    500
}

fn default_max_price_age_secs() -> u64 {
    3_600
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            collateral: AssetConfig {
                id: AssetId::new("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599"),
                symbol: "WBTC".to_string(),
                decimals: 8,
            },
            borrow: AssetConfig {
                id: AssetId::new("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
                symbol: "USDC".to_string(),
                decimals: 6,
            },
            liquidation_threshold_bps: default_liquidation_threshold_bps(),
            liquidation_bonus_bps: default_liquidation_bonus_bps(),
            max_price_age_secs: default_max_price_age_secs(),
            interest_rate: InterestRateConfig::default(),
        }
    }
}

impl PoolConfig {
    /// Check bounds that the pool relies on for its arithmetic.
    pub fn validate(&self) -> Result<()> {
        if self.collateral.id == self.borrow.id {
            return Err(Error::Config(
                "Collateral and borrow asset must differ".to_string(),
            ));
        }
        for asset in [&self.collateral, &self.borrow] {
            if asset.decimals > MAX_DECIMALS {
                return Err(Error::Config(format!(
                    "{} has {} decimals, maximum is {MAX_DECIMALS}",
                    asset.symbol, asset.decimals
                )));
            }
        }
        if self.liquidation_threshold_bps == 0 || self.liquidation_threshold_bps > BPS_DENOMINATOR
        {
            return Err(Error::Config(format!(
                "Liquidation threshold {} bps out of range (1..={BPS_DENOMINATOR})",
                self.liquidation_threshold_bps
            )));
        }
        if self.liquidation_bonus_bps > BPS_DENOMINATOR {
            return Err(Error::Config(format!(
                "Liquidation bonus {} bps exceeds {BPS_DENOMINATOR}",
                self.liquidation_bonus_bps
            )));
        }
        if let InterestRateConfig::Kinked {
            optimal_utilization_bps,
            ..
        } = self.interest_rate
        {
            if optimal_utilization_bps == 0 || optimal_utilization_bps >= BPS_DENOMINATOR {
                return Err(Error::Config(format!(
                    "Optimal utilization {optimal_utilization_bps} bps must be strictly between 0 and {BPS_DENOMINATOR}"
                )));
            }
        }
        Ok(())
    }
}

/// Which side of the pair a price source quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceRole {
    Collateral,
    Borrow,
}

impl PriceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collateral => "collateral",
            Self::Borrow => "borrow",
        }
    }
}

impl std::fmt::Display for PriceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static price declared in configuration (used by the monitoring server)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPriceConfig {
    /// Feed label, e.g. "WBTC/USD"
    pub label: String,
    pub asset: AssetId,
    pub role: PriceRole,
    /// Price as an integer with `decimals` precision
    pub price: i128,
    pub decimals: u8,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Account allowed to register price feeds
    pub admin: Address,

    pub pool: PoolConfig,

    #[serde(default)]
    pub prices: Vec<StaticPriceConfig>,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    18_545
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin: Address::new("0x0000000000000000000000000000000000000001"),
            pool: PoolConfig::default(),
            prices: Vec::new(),
            api_port: default_api_port(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        Address::parse(self.admin.as_str())?;
        AssetId::parse(self.pool.collateral.id.as_str())?;
        AssetId::parse(self.pool.borrow.id.as_str())?;
        self.pool.validate()?;
        for price in &self.prices {
            if price.price <= 0 {
                return Err(Error::Config(format!(
                    "Price for {} must be positive",
                    price.label
                )));
            }
            if price.decimals > MAX_DECIMALS {
                return Err(Error::Config(format!(
                    "Price for {} has {} decimals, maximum is {MAX_DECIMALS}",
                    price.label, price.decimals
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.pool.liquidation_threshold_bps, 8_000);
        assert_eq!(config.pool.collateral.decimals, 8);
        assert_eq!(config.pool.borrow.decimals, 6);
        assert_eq!(config.api_port, 18_545);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = AppConfig::from_json(&json).unwrap();
        assert_eq!(parsed.pool, config.pool);
    }

    #[test]
    fn test_config_defaults_filled_from_json() {
        let json = r#"{
            "admin": "0x0000000000000000000000000000000000000001",
            "pool": {
                "collateral": { "id": "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599", "symbol": "WBTC", "decimals": 8 },
                "borrow": { "id": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "symbol": "USDC", "decimals": 6 },
                "interest_rate": { "model": "fixed", "annual_rate_bps": 500 }
            },
            "prices": [
                { "label": "WBTC/USD", "asset": "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599",
                  "role": "collateral", "price": 9152761777140, "decimals": 8 }
            ]
        }"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.pool.liquidation_bonus_bps, 500);
        assert_eq!(config.pool.max_price_age_secs, 3_600);
        assert_eq!(
            config.pool.interest_rate,
            InterestRateConfig::Fixed {
                annual_rate_bps: 500
            }
        );
        assert_eq!(config.prices[0].role, PriceRole::Collateral);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = AppConfig::default();
        config.pool.liquidation_threshold_bps = 12_000;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_same_asset_pair_rejected() {
        let mut config = AppConfig::default();
        config.pool.borrow.id = config.pool.collateral.id.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        assert!(matches!(
            AppConfig::from_json("{ not json"),
            Err(Error::Serialization(_))
        ));
    }
}
