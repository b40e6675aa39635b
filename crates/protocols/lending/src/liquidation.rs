//! Liquidation Strategies
//!
//! A strategy decides how much collateral a liquidator receives for repaying
//! part of an unhealthy position's debt. The pool caps the result at the
//! position's collateral balance.

use std::fmt::Debug;

use tracrafter_core::LendingError;

use crate::constants::BPS_DENOMINATOR;

/// Values are in quote units (`VALUE_DECIMALS` digits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeizureInput {
    /// Value of the borrow asset the liquidator repays
    pub repay_value: u128,
    /// Collateral held by the position, in base units
    pub collateral_balance: u64,
    /// Value of the whole collateral balance
    pub collateral_value: u128,
}

pub trait LiquidationStrategy: Debug + Send + Sync {
    /// Collateral base units paid to the liquidator
    fn collateral_to_seize(&self, input: &SeizureInput) -> Result<u64, LendingError>;
}

/// Repaid value plus a fixed bonus, paid out in collateral at the oracle price.
///
/// `seized = repay_value * (10000 + bonus_bps) / 10000 * balance / collateral_value`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBonusLiquidation {
    pub bonus_bps: u64,
}

impl LiquidationStrategy for FixedBonusLiquidation {
    fn collateral_to_seize(&self, input: &SeizureInput) -> Result<u64, LendingError> {
        let overflow = LendingError::MathOverflow {
            context: "liquidation seizure",
        };
        let rewarded_value = input
            .repay_value
            .checked_mul(BPS_DENOMINATOR as u128 + self.bonus_bps as u128)
            .ok_or(overflow.clone())?
            / BPS_DENOMINATOR as u128;

        // Underwater: the whole balance is worth less than the reward
        if input.collateral_value == 0 || rewarded_value >= input.collateral_value {
            return Ok(input.collateral_balance);
        }

        let seized = rewarded_value
            .checked_mul(input.collateral_balance as u128)
            .ok_or(overflow)?
            / input.collateral_value;
        Ok(seized.min(input.collateral_balance as u128) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_applied_at_oracle_price() {
        let strategy = FixedBonusLiquidation { bonus_bps: 500 };
        // 1 BTC (1e8 units) worth 60,000; repay 10,000 -> 10,500 of collateral
        let seized = strategy
            .collateral_to_seize(&SeizureInput {
                repay_value: 10_000,
                collateral_balance: 100_000_000,
                collateral_value: 60_000,
            })
            .unwrap();
        assert_eq!(seized, 17_500_000);
    }

    #[test]
    fn test_underwater_position_loses_everything() {
        let strategy = FixedBonusLiquidation { bonus_bps: 500 };
        let input = SeizureInput {
            repay_value: 9_800,
            collateral_balance: 42,
            collateral_value: 10_000,
        };
        assert_eq!(strategy.collateral_to_seize(&input).unwrap(), 42);

        let worthless = SeizureInput {
            collateral_value: 0,
            ..input
        };
        assert_eq!(strategy.collateral_to_seize(&worthless).unwrap(), 42);
    }

    #[test]
    fn test_zero_bonus_is_value_neutral() {
        let strategy = FixedBonusLiquidation { bonus_bps: 0 };
        let seized = strategy
            .collateral_to_seize(&SeizureInput {
                repay_value: 250,
                collateral_balance: 1_000,
                collateral_value: 1_000,
            })
            .unwrap();
        assert_eq!(seized, 250);
    }
}
