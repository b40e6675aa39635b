//! Lending Pool Constants

pub use tracrafter_core::constants::{BPS_DENOMINATOR, SECONDS_PER_YEAR, VALUE_DECIMALS};

/// Interest rate defaults
pub mod interest {
    /// Flat 5% APR: 18 borrowed grows to 18.9 after one year
    pub const DEFAULT_FIXED_RATE_BPS: u64 = 500;
}

/// Health factor thresholds for monitoring
///
/// Health factor = collateral_value * liquidation_threshold / debt_value, in bps.
/// - >= HEALTHY_THRESHOLD_BPS (1.5): Safe position
/// - >= WARNING_THRESHOLD_BPS (1.2): At risk
/// - < WARNING_THRESHOLD_BPS: Danger; below LIQUIDATION_THRESHOLD_BPS it can be liquidated
pub mod health {
    pub const HEALTHY_THRESHOLD_BPS: u128 = 15_000;
    pub const WARNING_THRESHOLD_BPS: u128 = 12_000;
    pub const LIQUIDATION_THRESHOLD_BPS: u128 = 10_000;
}
