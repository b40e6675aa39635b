//! Interest Rate Models
//!
//! A model maps pool utilization to an annual borrow rate. The pool converts
//! that rate into simple interest for the elapsed period on every accrual.

use std::fmt::Debug;

use tracrafter_core::InterestRateConfig;

use crate::constants::BPS_DENOMINATOR;

/// Utilization-keyed borrow rate curve
pub trait InterestRateModel: Debug + Send + Sync {
    /// Annual borrow rate in bps at `utilization_bps`
    fn annual_rate_bps(&self, utilization_bps: u64) -> u64;
}

/// Same rate at every utilization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRateModel {
    pub annual_rate_bps: u64,
}

impl InterestRateModel for FixedRateModel {
    fn annual_rate_bps(&self, _utilization_bps: u64) -> u64 {
        self.annual_rate_bps
    }
}

/// Dual-slope curve.
/// - Below optimal: base + slope1 * utilization / optimal
/// - Above optimal: base + slope1 + slope2 * (utilization - optimal) / (1 - optimal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KinkedRateModel {
    pub base_rate_bps: u64,
    pub slope1_bps: u64,
    pub slope2_bps: u64,
    pub optimal_utilization_bps: u64,
}

impl InterestRateModel for KinkedRateModel {
    fn annual_rate_bps(&self, utilization_bps: u64) -> u64 {
        let utilization = utilization_bps.min(BPS_DENOMINATOR) as u128;
        let optimal = self.optimal_utilization_bps as u128;

        if utilization <= optimal {
            let variable = (self.slope1_bps as u128 * utilization)
                .checked_div(optimal)
                .unwrap_or(0);
            self.base_rate_bps.saturating_add(variable as u64)
        } else {
            let excess = utilization - optimal;
            let remaining = BPS_DENOMINATOR as u128 - optimal;
            let variable = (self.slope2_bps as u128 * excess)
                .checked_div(remaining)
                .unwrap_or(self.slope2_bps as u128);
            self.base_rate_bps
                .saturating_add(self.slope1_bps)
                .saturating_add(variable as u64)
        }
    }
}

/// Build the model described by a pool configuration
pub fn model_from_config(config: &InterestRateConfig) -> Box<dyn InterestRateModel> {
    match *config {
        InterestRateConfig::Fixed { annual_rate_bps } => {
            Box::new(FixedRateModel { annual_rate_bps })
        }
        InterestRateConfig::Kinked {
            base_rate_bps,
            slope1_bps,
            slope2_bps,
            optimal_utilization_bps,
        } => Box::new(KinkedRateModel {
            base_rate_bps,
            slope1_bps,
            slope2_bps,
            optimal_utilization_bps,
        }),
    }
}
