//! Lending State Types
//!
//! Pool totals and the read-only views exposed to monitoring.

use serde::{Deserialize, Serialize};
use tracrafter_core::{Address, AssetId, Timestamp};

/// Pool-wide counters.
///
/// Invariants kept by [`crate::LendingPool`]:
/// - `total_supply_assets >= total_borrow_assets`
/// - `total_supply_shares == 0` iff `total_supply_assets == 0` (same for borrow)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTotals {
    pub total_supply_assets: u64,
    pub total_supply_shares: u64,
    pub total_borrow_assets: u64,
    pub total_borrow_shares: u64,
    pub last_accrual: Timestamp,
    /// Interest earned but not yet a whole unit, scaled by
    /// [`crate::calculator::interest_denominator`]
    #[serde(default)]
    pub accrual_remainder: u128,
}

impl PoolTotals {
    /// Supplied assets not currently on loan
    pub fn available_liquidity(&self) -> u64 {
        self.total_supply_assets
            .saturating_sub(self.total_borrow_assets)
    }
}

/// Pool state for monitoring responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub collateral_asset: AssetId,
    pub collateral_symbol: String,
    pub borrow_asset: AssetId,
    pub borrow_symbol: String,

    // Pool metrics
    pub total_supply_assets: u64,
    pub total_supply_shares: u64,
    pub total_borrow_assets: u64,
    pub total_borrow_shares: u64,
    pub available_liquidity: u64,
    pub utilization_bps: u64,

    // Rates (annual, bps)
    pub borrow_rate_bps: u64,
    pub supply_rate_bps: u64,

    pub liquidation_threshold_bps: u64,
    pub last_accrual: Timestamp,

    pub supplier_count: usize,
    pub position_count: usize,
}

/// Lender's stake in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplySnapshot {
    pub account: Address,
    pub shares: u64,
    /// Assets the shares could be redeemed for at the last accrual
    pub assets: u64,
}

/// Borrower's position with its debt resolved to assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub owner: Address,
    pub collateral_balance: u64,
    pub borrow_shares: u64,
    pub debt_assets: u64,
}

/// Oracle-priced solvency of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionHealth {
    /// Collateral value in quote units
    pub collateral_value: u128,
    /// Debt value in quote units
    pub debt_value: u128,
    /// collateral_value * threshold / debt_value in bps (u128::MAX with no debt)
    pub health_factor_bps: u128,
    pub status: HealthStatus,
    pub liquidatable: bool,
}

/// Result of a withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub shares_burned: u64,
    pub assets: u64,
}

/// Result of a liquidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidation {
    pub shares_repaid: u64,
    pub collateral_seized: u64,
}

/// Health factor status for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy, // >= 1.5
    Warning, // >= 1.2 and < 1.5
    Danger,  // < 1.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_liquidity() {
        let totals = PoolTotals {
            total_supply_assets: 100,
            total_supply_shares: 100,
            total_borrow_assets: 18,
            total_borrow_shares: 18,
            last_accrual: 0,
            accrual_remainder: 0,
        };
        assert_eq!(totals.available_liquidity(), 82);
        assert_eq!(PoolTotals::default().available_liquidity(), 0);
    }

    #[test]
    fn test_health_serializes_large_factor() {
        let health = PositionHealth {
            collateral_value: 1_000,
            debt_value: 0,
            health_factor_bps: u128::MAX,
            status: HealthStatus::Healthy,
            liquidatable: false,
        };
        let json = serde_json::to_string(&health).unwrap();
        assert!(json.contains("\"health_factor_bps\":340282366920938463463374607431768211455"));
        assert!(json.contains("\"status\":\"Healthy\""));
    }
}
