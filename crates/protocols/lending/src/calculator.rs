//! Lending Calculator
//!
//! Pure math for share conversion, interest and health checks.
//! No I/O, no state - just calculations.
//!
//! # Rounding
//!
//! - Supply shares minted on deposit: down
//! - Supply shares burned on withdrawal: up
//! - Borrow shares minted on borrow: down
//! - Borrow shares cleared on repayment: down
//! - Debt owed for a share balance: up
//! - Assets claimable for a share balance: down
//!
//! Intermediate products use u128; results that do not fit u64 are reported
//! as `MathOverflow`.

use tracrafter_core::LendingError;

use crate::constants::{health, BPS_DENOMINATOR, SECONDS_PER_YEAR};
use crate::state::HealthStatus;

fn overflow(context: &'static str) -> LendingError {
    LendingError::MathOverflow { context }
}

fn to_u64(value: u128, context: &'static str) -> Result<u64, LendingError> {
    u64::try_from(value).map_err(|_| overflow(context))
}

/// floor(a * b / denominator)
pub fn mul_div_floor(
    a: u64,
    b: u64,
    denominator: u64,
    context: &'static str,
) -> Result<u64, LendingError> {
    if denominator == 0 {
        return Err(overflow(context));
    }
    to_u64((a as u128 * b as u128) / denominator as u128, context)
}

/// ceil(a * b / denominator)
pub fn mul_div_ceil(
    a: u64,
    b: u64,
    denominator: u64,
    context: &'static str,
) -> Result<u64, LendingError> {
    if denominator == 0 {
        return Err(overflow(context));
    }
    let product = a as u128 * b as u128;
    let denominator = denominator as u128;
    to_u64(product.div_ceil(denominator), context)
}

/// Supply shares minted for a deposit
/// shares = amount * total_shares / total_assets (1:1 on an empty pool)
pub fn supply_shares_for_deposit(
    amount: u64,
    total_assets: u64,
    total_shares: u64,
) -> Result<u64, LendingError> {
    if total_shares == 0 {
        return Ok(amount);
    }
    mul_div_floor(amount, total_shares, total_assets, "supply shares")
}

/// Supply shares burned to withdraw `amount`
pub fn supply_shares_for_withdrawal(
    amount: u64,
    total_assets: u64,
    total_shares: u64,
) -> Result<u64, LendingError> {
    if total_assets == 0 {
        return Ok(amount);
    }
    mul_div_ceil(amount, total_shares, total_assets, "withdraw shares")
}

/// Assets a supply-share balance can claim
pub fn supply_assets_for_shares(
    shares: u64,
    total_assets: u64,
    total_shares: u64,
) -> Result<u64, LendingError> {
    if total_shares == 0 {
        return Ok(0);
    }
    mul_div_floor(shares, total_assets, total_shares, "supply assets")
}

/// Borrow shares minted for a new loan (1:1 when nothing is borrowed)
pub fn borrow_shares_for_loan(
    amount: u64,
    total_assets: u64,
    total_shares: u64,
) -> Result<u64, LendingError> {
    if total_shares == 0 {
        return Ok(amount);
    }
    mul_div_floor(amount, total_shares, total_assets, "borrow shares")
}

/// Borrow shares cleared by a repayment of `amount`
pub fn borrow_shares_for_repayment(
    amount: u64,
    total_assets: u64,
    total_shares: u64,
) -> Result<u64, LendingError> {
    if total_assets == 0 {
        return Ok(0);
    }
    mul_div_floor(amount, total_shares, total_assets, "repay shares")
}

/// Debt owed for a borrow-share balance
pub fn debt_assets_for_shares(
    shares: u64,
    total_assets: u64,
    total_shares: u64,
) -> Result<u64, LendingError> {
    if total_shares == 0 {
        return Ok(0);
    }
    mul_div_ceil(shares, total_assets, total_shares, "debt assets")
}

/// Utilization in bps: total_borrowed * 10000 / total_supplied (0 with no supply)
pub fn utilization_bps(total_borrowed: u64, total_supplied: u64) -> u64 {
    if total_supplied == 0 {
        return 0;
    }
    ((total_borrowed as u128 * BPS_DENOMINATOR as u128) / total_supplied as u128) as u64
}

/// Interest for one accrual step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccruedInterest {
    /// Whole units added to the borrow and supply totals
    pub interest: u64,
    /// Sub-unit remainder carried to the next step, scaled by
    /// [`interest_denominator`]
    pub remainder: u128,
}

/// BPS * SECONDS_PER_YEAR, the scale of an interest remainder
pub fn interest_denominator() -> u128 {
    BPS_DENOMINATOR as u128 * SECONDS_PER_YEAR as u128
}

/// Simple interest over `elapsed` seconds at an annual rate
/// interest = (total_borrowed * rate_bps * elapsed + carry) / (10000 * SECONDS_PER_YEAR)
///
/// The division remainder is returned so that frequent accruals add up to
/// the same interest as one long accrual.
pub fn accrued_interest(
    total_borrowed: u64,
    annual_rate_bps: u64,
    elapsed_secs: u64,
    carry: u128,
) -> Result<AccruedInterest, LendingError> {
    let numerator = (total_borrowed as u128)
        .checked_mul(annual_rate_bps as u128)
        .and_then(|v| v.checked_mul(elapsed_secs as u128))
        .and_then(|v| v.checked_add(carry))
        .ok_or(overflow("interest accrual"))?;
    let denominator = interest_denominator();
    Ok(AccruedInterest {
        interest: to_u64(numerator / denominator, "interest accrual")?,
        remainder: numerator % denominator,
    })
}

/// Supply-side rate implied by a borrow rate at a given utilization
pub fn supply_rate_bps(borrow_rate_bps: u64, utilization_bps: u64) -> u64 {
    ((borrow_rate_bps as u128 * utilization_bps as u128) / BPS_DENOMINATOR as u128) as u64
}

/// Largest debt value a collateral value supports
pub fn max_debt_value(collateral_value: u128, liquidation_threshold_bps: u64) -> u128 {
    collateral_value.saturating_mul(liquidation_threshold_bps as u128) / BPS_DENOMINATOR as u128
}

/// collateral_value * threshold >= debt_value, compared without division
pub fn is_within_threshold(
    collateral_value: u128,
    debt_value: u128,
    liquidation_threshold_bps: u64,
) -> Result<bool, LendingError> {
    let capacity = collateral_value
        .checked_mul(liquidation_threshold_bps as u128)
        .ok_or(overflow("health check"))?;
    let required = debt_value
        .checked_mul(BPS_DENOMINATOR as u128)
        .ok_or(overflow("health check"))?;
    Ok(capacity >= required)
}

/// Health factor in bps; 10000 is the liquidation boundary
/// health = collateral_value * liquidation_threshold / debt_value
pub fn health_factor_bps(
    collateral_value: u128,
    debt_value: u128,
    liquidation_threshold_bps: u64,
) -> u128 {
    if debt_value == 0 {
        return u128::MAX; // No debt = infinite health
    }
    collateral_value.saturating_mul(liquidation_threshold_bps as u128) / debt_value
}

/// Below 1.0 a position may be liquidated. Equivalent to failing
/// [`is_within_threshold`] since the factor is floored.
pub fn is_liquidatable(health_factor_bps: u128) -> bool {
    health_factor_bps < health::LIQUIDATION_THRESHOLD_BPS
}

/// Determine health status from health factor
pub fn health_status(health_factor_bps: u128) -> HealthStatus {
    if health_factor_bps >= health::HEALTHY_THRESHOLD_BPS {
        HealthStatus::Healthy
    } else if health_factor_bps >= health::WARNING_THRESHOLD_BPS {
        HealthStatus::Warning
    } else {
        HealthStatus::Danger
    }
}
