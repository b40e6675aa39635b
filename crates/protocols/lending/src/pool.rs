//! Lending Pool
//!
//! Central ledger for one collateral/borrow asset pair. Lenders hold supply
//! shares, borrowers hold borrow shares inside their [`Position`]. Every
//! mutating entry point:
//!
//! 1. refuses to run while another operation is in progress,
//! 2. accrues interest up to the current clock reading,
//! 3. validates and updates accounting,
//! 4. moves tokens through [`AssetTransfer`] last.
//!
//! Any failure restores the totals and the touched records to their values
//! before the call.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use price_feed::{PriceFeed, Rounding};
use tracrafter_core::{Address, AssetId, LendingError, PoolConfig, PriceRole, Timestamp};

use crate::calculator;
use crate::clock::Clock;
use crate::interest::{model_from_config, InterestRateModel};
use crate::liquidation::{FixedBonusLiquidation, LiquidationStrategy, SeizureInput};
use crate::position::{Position, PositionBook, PositionId};
use crate::state::{
    Liquidation, PoolSnapshot, PoolTotals, PositionHealth, PositionSnapshot, SupplySnapshot,
    Withdrawal,
};
use crate::transfer::{AssetTransfer, TransferError};

fn add(a: u64, b: u64, context: &'static str) -> Result<u64, LendingError> {
    a.checked_add(b).ok_or(LendingError::MathOverflow { context })
}

fn sub(a: u64, b: u64, context: &'static str) -> Result<u64, LendingError> {
    a.checked_sub(b).ok_or(LendingError::MathOverflow { context })
}

fn transfer_failed(asset: &AssetId, err: TransferError) -> LendingError {
    LendingError::TransferFailed {
        asset: asset.to_string(),
        reason: err.to_string(),
    }
}

/// State captured before an operation runs
struct Checkpoint {
    totals: PoolTotals,
    supply: Vec<(Address, Option<u64>)>,
    positions: Vec<(Address, Option<Position>)>,
}

pub struct LendingPool {
    config: PoolConfig,
    totals: PoolTotals,
    supply_shares: HashMap<Address, u64>,
    positions: PositionBook,
    price_feed: Arc<PriceFeed>,
    interest_model: Box<dyn InterestRateModel>,
    liquidation: Box<dyn LiquidationStrategy>,
    transfers: Box<dyn AssetTransfer>,
    clock: Arc<dyn Clock>,
    in_progress: bool,
}

impl fmt::Debug for LendingPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LendingPool")
            .field("collateral", &self.config.collateral.symbol)
            .field("borrow", &self.config.borrow.symbol)
            .field("totals", &self.totals)
            .field("interest_model", &self.interest_model)
            .field("liquidation", &self.liquidation)
            .finish_non_exhaustive()
    }
}

impl LendingPool {
    /// Create an empty pool. Interest starts accruing from the current clock reading.
    pub fn new(
        config: PoolConfig,
        price_feed: Arc<PriceFeed>,
        transfers: Box<dyn AssetTransfer>,
        clock: Arc<dyn Clock>,
    ) -> tracrafter_core::Result<Self> {
        config.validate()?;
        let totals = PoolTotals {
            last_accrual: clock.now(),
            ..PoolTotals::default()
        };
        tracing::info!(
            collateral = %config.collateral.symbol,
            borrow = %config.borrow.symbol,
            threshold_bps = config.liquidation_threshold_bps,
            "Created lending pool"
        );
        Ok(Self {
            interest_model: model_from_config(&config.interest_rate),
            liquidation: Box::new(FixedBonusLiquidation {
                bonus_bps: config.liquidation_bonus_bps,
            }),
            config,
            totals,
            supply_shares: HashMap::new(),
            positions: PositionBook::new(),
            price_feed,
            transfers,
            clock,
            in_progress: false,
        })
    }

    pub fn with_interest_model(mut self, model: Box<dyn InterestRateModel>) -> Self {
        self.interest_model = model;
        self
    }

    pub fn with_liquidation_strategy(mut self, strategy: Box<dyn LiquidationStrategy>) -> Self {
        self.liquidation = strategy;
        self
    }

    // =========================================================================
    // Operation guard
    // =========================================================================

    fn checkpoint(&self, accounts: &[&Address]) -> Checkpoint {
        Checkpoint {
            totals: self.totals,
            supply: accounts
                .iter()
                .map(|a| ((*a).clone(), self.supply_shares.get(*a).copied()))
                .collect(),
            positions: accounts
                .iter()
                .map(|a| ((*a).clone(), self.positions.by_owner(a).cloned()))
                .collect(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.totals = checkpoint.totals;
        for (account, shares) in checkpoint.supply.into_iter().rev() {
            match shares {
                Some(shares) => self.supply_shares.insert(account, shares),
                None => self.supply_shares.remove(&account),
            };
        }
        for (owner, position) in checkpoint.positions.into_iter().rev() {
            self.positions.restore(&owner, position);
        }
    }

    /// Run `op` atomically with respect to the totals and the records of `accounts`
    fn run<T>(
        &mut self,
        operation: &'static str,
        accounts: &[&Address],
        op: impl FnOnce(&mut Self) -> Result<T, LendingError>,
    ) -> Result<T, LendingError> {
        if self.in_progress {
            tracing::warn!(operation, "Rejected re-entrant call");
            return Err(LendingError::ReentrantCall { operation });
        }
        self.in_progress = true;
        let checkpoint = self.checkpoint(accounts);

        let result = op(self);
        if let Err(e) = &result {
            tracing::debug!(operation, error = %e, "Operation reverted");
            self.restore(checkpoint);
        }

        self.in_progress = false;
        result
    }

    // =========================================================================
    // Interest
    // =========================================================================

    /// Bring totals up to the clock; returns the reading used
    fn accrue(&mut self) -> Result<Timestamp, LendingError> {
        let now = self.clock.now();
        let elapsed = now.saturating_sub(self.totals.last_accrual);
        if elapsed == 0 {
            return Ok(now);
        }

        let utilization = calculator::utilization_bps(
            self.totals.total_borrow_assets,
            self.totals.total_supply_assets,
        );
        let rate = self.interest_model.annual_rate_bps(utilization);
        let step = calculator::accrued_interest(
            self.totals.total_borrow_assets,
            rate,
            elapsed,
            self.totals.accrual_remainder,
        )?;
        let interest = step.interest;

        self.totals.total_borrow_assets =
            add(self.totals.total_borrow_assets, interest, "interest accrual")?;
        self.totals.total_supply_assets =
            add(self.totals.total_supply_assets, interest, "interest accrual")?;
        // Fractional interest stays owed; it is dropped once nothing is borrowed
        self.totals.accrual_remainder = if self.totals.total_borrow_assets == 0 {
            0
        } else {
            step.remainder
        };
        self.totals.last_accrual = now;

        if interest > 0 {
            tracing::debug!(elapsed, rate_bps = rate, utilization_bps = utilization, interest, "Accrued interest");
        }
        Ok(now)
    }

    /// Accrue interest up to now. Returns the interest added to both totals.
    pub fn accrue_interest(&mut self) -> Result<u64, LendingError> {
        self.run("accrue_interest", &[], |pool| {
            let before = pool.totals.total_borrow_assets;
            pool.accrue()?;
            Ok(pool.totals.total_borrow_assets - before)
        })
    }

    // =========================================================================
    // Lender operations
    // =========================================================================

    /// Deposit borrow-asset liquidity. Returns the supply shares minted.
    pub fn supply(&mut self, caller: &Address, amount: u64) -> Result<u64, LendingError> {
        self.run("supply", &[caller], |pool| {
            if amount == 0 {
                return Err(LendingError::ZeroAmount);
            }
            pool.accrue()?;

            let shares = calculator::supply_shares_for_deposit(
                amount,
                pool.totals.total_supply_assets,
                pool.totals.total_supply_shares,
            )?;
            if shares == 0 {
                return Err(LendingError::ZeroAmount);
            }

            pool.totals.total_supply_assets =
                add(pool.totals.total_supply_assets, amount, "total supply assets")?;
            pool.totals.total_supply_shares =
                add(pool.totals.total_supply_shares, shares, "total supply shares")?;
            let held = pool.supply_shares.entry(caller.clone()).or_default();
            *held = add(*held, shares, "supply shares")?;

            pool.transfers
                .transfer_in(&pool.config.borrow.id, caller, amount)
                .map_err(|e| transfer_failed(&pool.config.borrow.id, e))?;

            tracing::info!(account = %caller, amount, shares, "Supplied");
            Ok(shares)
        })
    }

    /// Redeem supply shares for `amount` of the borrow asset.
    pub fn withdraw(&mut self, caller: &Address, amount: u64) -> Result<Withdrawal, LendingError> {
        self.run("withdraw", &[caller], |pool| {
            if amount == 0 {
                return Err(LendingError::ZeroAmount);
            }
            pool.accrue()?;

            let totals = pool.totals;
            let shares = calculator::supply_shares_for_withdrawal(
                amount,
                totals.total_supply_assets,
                totals.total_supply_shares,
            )?;
            let held = pool.supply_shares.get(caller).copied().unwrap_or(0);
            if shares > held {
                return Err(LendingError::InsufficientShares {
                    required: shares,
                    available: held,
                });
            }

            let remaining_assets = sub(totals.total_supply_assets, amount, "total supply assets")?;
            if remaining_assets < totals.total_borrow_assets {
                return Err(LendingError::InsufficientLiquidity {
                    requested: amount,
                    available: totals.available_liquidity(),
                });
            }
            let remaining_shares = sub(totals.total_supply_shares, shares, "total supply shares")?;
            // Burning the last share must take the last asset with it
            if remaining_shares == 0 && remaining_assets > 0 {
                return Err(LendingError::InsufficientShares {
                    required: shares,
                    available: held,
                });
            }

            pool.totals.total_supply_assets = remaining_assets;
            pool.totals.total_supply_shares = remaining_shares;
            if held == shares {
                pool.supply_shares.remove(caller);
            } else {
                pool.supply_shares.insert(caller.clone(), held - shares);
            }

            pool.transfers
                .transfer_out(&pool.config.borrow.id, caller, amount)
                .map_err(|e| transfer_failed(&pool.config.borrow.id, e))?;

            tracing::info!(account = %caller, amount, shares, "Withdrew");
            Ok(Withdrawal {
                shares_burned: shares,
                assets: amount,
            })
        })
    }

    // =========================================================================
    // Borrower operations
    // =========================================================================

    fn position_id(&self, owner: &Address) -> Result<PositionId, LendingError> {
        self.positions
            .id_of(owner)
            .ok_or_else(|| LendingError::PositionNotFound {
                owner: owner.to_string(),
            })
    }

    fn position_mut(&mut self, id: PositionId) -> Result<&mut Position, LendingError> {
        self.positions
            .get_mut(id)
            .ok_or_else(|| LendingError::PositionNotFound {
                owner: format!("slot {}", id.0),
            })
    }

    /// Collateral is valued rounding down
    fn collateral_value(&self, balance: u64, now: Timestamp) -> Result<u128, LendingError> {
        self.price_feed.value_of(
            PriceRole::Collateral,
            &self.config.collateral.id,
            balance,
            self.config.collateral.decimals,
            Rounding::Down,
            now,
        )
    }

    fn borrow_asset_value(
        &self,
        amount: u64,
        rounding: Rounding,
        now: Timestamp,
    ) -> Result<u128, LendingError> {
        self.price_feed.value_of(
            PriceRole::Borrow,
            &self.config.borrow.id,
            amount,
            self.config.borrow.decimals,
            rounding,
            now,
        )
    }

    /// Debt is valued rounding up; any nonzero debt is worth at least one quote unit
    fn debt_value(&self, debt_assets: u64, now: Timestamp) -> Result<u128, LendingError> {
        self.borrow_asset_value(debt_assets, Rounding::Up, now)
    }

    fn ensure_within_threshold(
        &self,
        collateral_value: u128,
        debt_value: u128,
    ) -> Result<(), LendingError> {
        let threshold = self.config.liquidation_threshold_bps;
        if !calculator::is_within_threshold(collateral_value, debt_value, threshold)? {
            return Err(LendingError::Undercollateralized {
                debt_value,
                max_debt_value: calculator::max_debt_value(collateral_value, threshold),
            });
        }
        Ok(())
    }

    fn debt_for_shares(&self, shares: u64) -> Result<u64, LendingError> {
        calculator::debt_assets_for_shares(
            shares,
            self.totals.total_borrow_assets,
            self.totals.total_borrow_shares,
        )
    }

    /// Deposit collateral, opening a position on first use. Returns the new balance.
    pub fn supply_collateral_by_position(
        &mut self,
        caller: &Address,
        amount: u64,
    ) -> Result<u64, LendingError> {
        self.run("supply_collateral", &[caller], |pool| {
            if amount == 0 {
                return Err(LendingError::ZeroAmount);
            }
            pool.accrue()?;

            let id = pool.positions.get_or_create(caller);
            let position = pool.position_mut(id)?;
            position.add_collateral(amount)?;
            let balance = position.collateral_balance();

            pool.transfers
                .transfer_in(&pool.config.collateral.id, caller, amount)
                .map_err(|e| transfer_failed(&pool.config.collateral.id, e))?;

            tracing::info!(owner = %caller, amount, balance, "Supplied collateral");
            Ok(balance)
        })
    }

    /// Take collateral back out. A position with debt must stay within the threshold.
    pub fn withdraw_collateral_by_position(
        &mut self,
        caller: &Address,
        amount: u64,
    ) -> Result<u64, LendingError> {
        self.run("withdraw_collateral", &[caller], |pool| {
            if amount == 0 {
                return Err(LendingError::ZeroAmount);
            }
            let now = pool.accrue()?;

            let id = pool.position_id(caller)?;
            let position = pool.position_mut(id)?;
            position.remove_collateral(amount)?;
            let balance = position.collateral_balance();
            let shares = position.borrow_shares();

            if shares > 0 {
                let debt = pool.debt_for_shares(shares)?;
                let collateral_value = pool.collateral_value(balance, now)?;
                let debt_value = pool.debt_value(debt, now)?;
                pool.ensure_within_threshold(collateral_value, debt_value)?;
            }

            pool.transfers
                .transfer_out(&pool.config.collateral.id, caller, amount)
                .map_err(|e| transfer_failed(&pool.config.collateral.id, e))?;

            tracing::info!(owner = %caller, amount, balance, "Withdrew collateral");
            Ok(balance)
        })
    }

    /// Borrow against the caller's position. Returns the borrow shares minted.
    pub fn borrow_by_position(&mut self, caller: &Address, amount: u64) -> Result<u64, LendingError> {
        self.run("borrow", &[caller], |pool| {
            if amount == 0 {
                return Err(LendingError::ZeroAmount);
            }
            let now = pool.accrue()?;

            let id = pool.position_id(caller)?;
            let (balance, held) = {
                let position = pool.position_mut(id)?;
                (position.collateral_balance(), position.borrow_shares())
            };

            let current_debt = pool.debt_for_shares(held)?;
            let prospective_debt = add(current_debt, amount, "prospective debt")?;
            let collateral_value = pool.collateral_value(balance, now)?;
            let debt_value = pool.debt_value(prospective_debt, now)?;
            pool.ensure_within_threshold(collateral_value, debt_value)?;

            let available = pool.totals.available_liquidity();
            if amount > available {
                return Err(LendingError::InsufficientLiquidity {
                    requested: amount,
                    available,
                });
            }

            let shares = calculator::borrow_shares_for_loan(
                amount,
                pool.totals.total_borrow_assets,
                pool.totals.total_borrow_shares,
            )?;
            if shares == 0 {
                return Err(LendingError::ZeroAmount);
            }

            pool.totals.total_borrow_assets =
                add(pool.totals.total_borrow_assets, amount, "total borrow assets")?;
            pool.totals.total_borrow_shares =
                add(pool.totals.total_borrow_shares, shares, "total borrow shares")?;
            let new_shares = add(held, shares, "position borrow shares")?;
            pool.position_mut(id)?.set_borrow_shares(new_shares);

            pool.transfers
                .transfer_out(&pool.config.borrow.id, caller, amount)
                .map_err(|e| transfer_failed(&pool.config.borrow.id, e))?;

            tracing::info!(
                owner = %caller,
                amount,
                shares,
                collateral_value,
                debt_value,
                "Borrowed"
            );
            Ok(shares)
        })
    }

    /// Repay debt on the caller's position. Returns the borrow shares cleared.
    ///
    /// Shares are cleared rounding down; the remainder stays with the pool.
    pub fn repay_by_position(&mut self, caller: &Address, amount: u64) -> Result<u64, LendingError> {
        self.run("repay", &[caller], |pool| {
            if amount == 0 {
                return Err(LendingError::ZeroAmount);
            }
            pool.accrue()?;

            let id = pool.position_id(caller)?;
            let held = pool.position_mut(id)?.borrow_shares();
            let totals = pool.totals;

            let shares = calculator::borrow_shares_for_repayment(
                amount,
                totals.total_borrow_assets,
                totals.total_borrow_shares,
            )?;
            if amount > totals.total_borrow_assets || shares > held {
                let required = if totals.total_borrow_assets == 0 {
                    amount
                } else {
                    shares
                };
                return Err(LendingError::InsufficientShares {
                    required,
                    available: held,
                });
            }
            if shares == 0 {
                return Err(LendingError::ZeroAmount);
            }

            pool.totals.total_borrow_assets =
                sub(totals.total_borrow_assets, amount, "total borrow assets")?;
            pool.totals.total_borrow_shares =
                sub(totals.total_borrow_shares, shares, "total borrow shares")?;
            pool.position_mut(id)?.set_borrow_shares(held - shares);

            pool.transfers
                .transfer_in(&pool.config.borrow.id, caller, amount)
                .map_err(|e| transfer_failed(&pool.config.borrow.id, e))?;

            tracing::info!(owner = %caller, amount, shares, "Repaid");
            Ok(shares)
        })
    }

    /// Repay part of an unhealthy position's debt in exchange for its collateral.
    pub fn liquidate(
        &mut self,
        liquidator: &Address,
        owner: &Address,
        repay_amount: u64,
    ) -> Result<Liquidation, LendingError> {
        self.run("liquidate", &[owner], |pool| {
            if repay_amount == 0 {
                return Err(LendingError::ZeroAmount);
            }
            let now = pool.accrue()?;

            let id = pool.position_id(owner)?;
            let (balance, held) = {
                let position = pool.position_mut(id)?;
                (position.collateral_balance(), position.borrow_shares())
            };

            let debt = pool.debt_for_shares(held)?;
            let collateral_value = pool.collateral_value(balance, now)?;
            let debt_value = pool.debt_value(debt, now)?;
            let threshold = pool.config.liquidation_threshold_bps;
            if debt == 0 || calculator::is_within_threshold(collateral_value, debt_value, threshold)? {
                return Err(LendingError::NotLiquidatable {
                    owner: owner.to_string(),
                });
            }
            if repay_amount > debt {
                return Err(LendingError::ExceedsDebt {
                    requested: repay_amount,
                    outstanding: debt,
                });
            }

            let totals = pool.totals;
            let shares = calculator::borrow_shares_for_repayment(
                repay_amount,
                totals.total_borrow_assets,
                totals.total_borrow_shares,
            )?
            .min(held);
            if shares == 0 {
                return Err(LendingError::ZeroAmount);
            }

            // Repayment credit rounds down so seizure never overpays
            let repay_value = pool.borrow_asset_value(repay_amount, Rounding::Down, now)?;
            let seized = pool
                .liquidation
                .collateral_to_seize(&SeizureInput {
                    repay_value,
                    collateral_balance: balance,
                    collateral_value,
                })?
                .min(balance);

            pool.totals.total_borrow_assets =
                sub(totals.total_borrow_assets, repay_amount, "total borrow assets")?;
            pool.totals.total_borrow_shares =
                sub(totals.total_borrow_shares, shares, "total borrow shares")?;
            let position = pool.position_mut(id)?;
            position.set_borrow_shares(held - shares);
            position.remove_collateral(seized)?;

            pool.transfers
                .transfer_in(&pool.config.borrow.id, liquidator, repay_amount)
                .map_err(|e| transfer_failed(&pool.config.borrow.id, e))?;
            if let Err(e) = pool
                .transfers
                .transfer_out(&pool.config.collateral.id, liquidator, seized)
            {
                if let Err(refund) =
                    pool.transfers
                        .transfer_out(&pool.config.borrow.id, liquidator, repay_amount)
                {
                    tracing::warn!(liquidator = %liquidator, error = %refund, "Failed to refund liquidation repayment");
                }
                return Err(transfer_failed(&pool.config.collateral.id, e));
            }

            tracing::info!(
                liquidator = %liquidator,
                owner = %owner,
                repay_amount,
                shares,
                seized,
                "Liquidated position"
            );
            Ok(Liquidation {
                shares_repaid: shares,
                collateral_seized: seized,
            })
        })
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn totals(&self) -> PoolTotals {
        self.totals
    }

    pub fn price_feed(&self) -> &Arc<PriceFeed> {
        &self.price_feed
    }

    pub fn positions(&self) -> &PositionBook {
        &self.positions
    }

    pub fn position(&self, owner: &Address) -> Option<&Position> {
        self.positions.by_owner(owner)
    }

    pub fn supply_shares_of(&self, account: &Address) -> u64 {
        self.supply_shares.get(account).copied().unwrap_or(0)
    }

    pub fn supplier_count(&self) -> usize {
        self.supply_shares.len()
    }

    /// Borrow-asset units `account` could redeem at the last accrual
    pub fn supply_assets_of(&self, account: &Address) -> Result<u64, LendingError> {
        calculator::supply_assets_for_shares(
            self.supply_shares_of(account),
            self.totals.total_supply_assets,
            self.totals.total_supply_shares,
        )
    }

    /// Outstanding debt of `owner` at the last accrual, rounded up
    pub fn debt_assets_of(&self, owner: &Address) -> Result<u64, LendingError> {
        let id = self.position_id(owner)?;
        let shares = self.positions.get(id).map_or(0, Position::borrow_shares);
        self.debt_for_shares(shares)
    }

    pub fn utilization_bps(&self) -> u64 {
        calculator::utilization_bps(
            self.totals.total_borrow_assets,
            self.totals.total_supply_assets,
        )
    }

    pub fn borrow_rate_bps(&self) -> u64 {
        self.interest_model.annual_rate_bps(self.utilization_bps())
    }

    pub fn supply_rate_bps(&self) -> u64 {
        calculator::supply_rate_bps(self.borrow_rate_bps(), self.utilization_bps())
    }

    /// Price `owner`'s position at the current clock reading
    pub fn position_health(&self, owner: &Address) -> Result<PositionHealth, LendingError> {
        let now = self.clock.now();
        let id = self.position_id(owner)?;
        let (balance, shares) = self
            .positions
            .get(id)
            .map_or((0, 0), |p| (p.collateral_balance(), p.borrow_shares()));

        let collateral_value = self.collateral_value(balance, now)?;
        let debt_value = self.debt_value(self.debt_for_shares(shares)?, now)?;
        let threshold = self.config.liquidation_threshold_bps;
        let health_factor_bps =
            calculator::health_factor_bps(collateral_value, debt_value, threshold);

        Ok(PositionHealth {
            collateral_value,
            debt_value,
            health_factor_bps,
            status: calculator::health_status(health_factor_bps),
            liquidatable: calculator::is_liquidatable(health_factor_bps),
        })
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let totals = self.totals;
        PoolSnapshot {
            collateral_asset: self.config.collateral.id.clone(),
            collateral_symbol: self.config.collateral.symbol.clone(),
            borrow_asset: self.config.borrow.id.clone(),
            borrow_symbol: self.config.borrow.symbol.clone(),
            total_supply_assets: totals.total_supply_assets,
            total_supply_shares: totals.total_supply_shares,
            total_borrow_assets: totals.total_borrow_assets,
            total_borrow_shares: totals.total_borrow_shares,
            available_liquidity: totals.available_liquidity(),
            utilization_bps: self.utilization_bps(),
            borrow_rate_bps: self.borrow_rate_bps(),
            supply_rate_bps: self.supply_rate_bps(),
            liquidation_threshold_bps: self.config.liquidation_threshold_bps,
            last_accrual: totals.last_accrual,
            supplier_count: self.supplier_count(),
            position_count: self.positions.len(),
        }
    }

    pub fn supply_snapshot(&self, account: &Address) -> Result<SupplySnapshot, LendingError> {
        Ok(SupplySnapshot {
            account: account.clone(),
            shares: self.supply_shares_of(account),
            assets: self.supply_assets_of(account)?,
        })
    }

    pub fn position_snapshot(&self, owner: &Address) -> Result<PositionSnapshot, LendingError> {
        let position = self
            .position(owner)
            .ok_or_else(|| LendingError::PositionNotFound {
                owner: owner.to_string(),
            })?;
        Ok(PositionSnapshot {
            owner: owner.clone(),
            collateral_balance: position.collateral_balance(),
            borrow_shares: position.borrow_shares(),
            debt_assets: self.debt_for_shares(position.borrow_shares())?,
        })
    }
}
