//! Price Feed Registry
//!
//! Maps (asset, role) pairs to price sources and turns raw asset amounts into
//! values in a common quote unit.
//!
//! # Units
//!
//! - Raw amounts: token base units (`asset_decimals` digits)
//! - Prices: source-native precision (`price_decimals` digits)
//! - Values: quote units with [`VALUE_DECIMALS`] digits
//!
//! `value = amount * price / 10^(asset_decimals + price_decimals - VALUE_DECIMALS)`

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracrafter_core::constants::VALUE_DECIMALS;
use tracrafter_core::{Address, AssetId, LendingError, PriceRole, Timestamp};

use crate::source::PriceSource;

/// Registered price source for one asset in one role
#[derive(Clone)]
pub struct PriceFeedEntry {
    pub source: Arc<dyn PriceSource>,
    pub description: String,
    pub decimals: u8,
}

impl fmt::Debug for PriceFeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceFeedEntry")
            .field("description", &self.description)
            .field("decimals", &self.decimals)
            .finish_non_exhaustive()
    }
}

impl PriceFeedEntry {
    fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            description: source.description(),
            decimals: source.decimals(),
            source,
        }
    }
}

/// Validated price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub price: u128,
    pub decimals: u8,
}

/// Oracle registry owned by one deployment.
///
/// Registration is admin-gated; reads are open. Interior locking lets a pool
/// hold the feed behind an `Arc` while the admin keeps registering sources.
pub struct PriceFeed {
    admin: Address,
    max_price_age_secs: u64,
    labeled: RwLock<HashMap<String, Arc<dyn PriceSource>>>,
    pairs: RwLock<HashMap<(AssetId, PriceRole), PriceFeedEntry>>,
}

impl fmt::Debug for PriceFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceFeed")
            .field("admin", &self.admin)
            .field("max_price_age_secs", &self.max_price_age_secs)
            .finish_non_exhaustive()
    }
}

impl PriceFeed {
    pub fn new(admin: Address, max_price_age_secs: u64) -> Self {
        Self {
            admin,
            max_price_age_secs,
            labeled: RwLock::new(HashMap::new()),
            pairs: RwLock::new(HashMap::new()),
        }
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn max_price_age_secs(&self) -> u64 {
        self.max_price_age_secs
    }

    fn ensure_admin(&self, caller: &Address, action: &str) -> Result<(), LendingError> {
        if caller != &self.admin {
            tracing::warn!(caller = %caller, action, "Rejected price feed update");
            return Err(LendingError::Unauthorized {
                caller: caller.to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    /// Register (or replace) a labeled source, e.g. "WBTC/USD"
    pub fn add_price_feed(
        &self,
        caller: &Address,
        label: impl Into<String>,
        source: Arc<dyn PriceSource>,
    ) -> Result<(), LendingError> {
        self.ensure_admin(caller, "add price feed")?;
        let label = label.into();
        tracing::info!(label = %label, description = %source.description(), "Registered price feed");
        self.labeled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(label, source);
        Ok(())
    }

    pub fn add_pair_price_collateral(
        &self,
        caller: &Address,
        asset: AssetId,
        source: Arc<dyn PriceSource>,
    ) -> Result<(), LendingError> {
        self.ensure_admin(caller, "add collateral price")?;
        self.insert_pair(asset, PriceRole::Collateral, source);
        Ok(())
    }

    pub fn add_pair_price_borrow(
        &self,
        caller: &Address,
        asset: AssetId,
        source: Arc<dyn PriceSource>,
    ) -> Result<(), LendingError> {
        self.ensure_admin(caller, "add borrow price")?;
        self.insert_pair(asset, PriceRole::Borrow, source);
        Ok(())
    }

    /// Point an asset role at a source previously registered with [`Self::add_price_feed`]
    pub fn bind_pair_by_label(
        &self,
        caller: &Address,
        asset: AssetId,
        role: PriceRole,
        label: &str,
    ) -> Result<(), LendingError> {
        self.ensure_admin(caller, "bind price feed")?;
        let source = self
            .labeled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(label)
            .cloned()
            .ok_or_else(|| LendingError::FeedNotFound {
                asset: label.to_string(),
                role: role.to_string(),
            })?;
        self.insert_pair(asset, role, source);
        Ok(())
    }

    fn insert_pair(&self, asset: AssetId, role: PriceRole, source: Arc<dyn PriceSource>) {
        let entry = PriceFeedEntry::new(source);
        tracing::info!(
            asset = %asset,
            role = %role,
            description = %entry.description,
            decimals = entry.decimals,
            "Registered pair price"
        );
        self.pairs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((asset, role), entry);
    }

    pub fn is_registered(&self, asset: &AssetId, role: PriceRole) -> bool {
        self.pairs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(asset.clone(), role))
    }

    fn entry(&self, asset: &AssetId, role: PriceRole) -> Result<PriceFeedEntry, LendingError> {
        self.pairs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(asset.clone(), role))
            .cloned()
            .ok_or_else(|| LendingError::FeedNotFound {
                asset: asset.to_string(),
                role: role.to_string(),
            })
    }

    /// Latest validated price for `asset` in `role`
    pub fn price(
        &self,
        role: PriceRole,
        asset: &AssetId,
        now: Timestamp,
    ) -> Result<Quote, LendingError> {
        let entry = self.entry(asset, role)?;
        let invalid = |reason: String| {
            tracing::debug!(asset = %asset, role = %role, reason = %reason, "Rejected price");
            LendingError::StaleOrInvalidPrice {
                asset: asset.to_string(),
                reason,
            }
        };

        let reading = entry
            .source
            .latest_price()
            .map_err(|e| invalid(format!("source error: {e}")))?;

        if reading.value <= 0 {
            return Err(invalid(format!("non-positive price {}", reading.value)));
        }
        if let Some(updated_at) = reading.updated_at {
            if updated_at > now {
                return Err(invalid(format!(
                    "reading from the future ({updated_at} > {now})"
                )));
            }
            let age = now - updated_at;
            if age > self.max_price_age_secs {
                return Err(invalid(format!(
                    "reading is {age}s old, limit {}s",
                    self.max_price_age_secs
                )));
            }
        }

        Ok(Quote {
            price: reading.value as u128,
            decimals: reading.decimals,
        })
    }

    pub fn price_collateral(&self, asset: &AssetId, now: Timestamp) -> Result<Quote, LendingError> {
        self.price(PriceRole::Collateral, asset, now)
    }

    pub fn price_borrow(&self, asset: &AssetId, now: Timestamp) -> Result<Quote, LendingError> {
        self.price(PriceRole::Borrow, asset, now)
    }

    /// Precision of the collateral-side source
    pub fn get_quote_decimal(&self, asset: &AssetId) -> Result<u8, LendingError> {
        Ok(self.entry(asset, PriceRole::Collateral)?.decimals)
    }

    /// Precision of the borrow-side source
    pub fn get_base_decimal(&self, asset: &AssetId) -> Result<u8, LendingError> {
        Ok(self.entry(asset, PriceRole::Borrow)?.decimals)
    }

    pub fn get_quote_description(&self, asset: &AssetId) -> Result<String, LendingError> {
        Ok(self.entry(asset, PriceRole::Collateral)?.description)
    }

    pub fn get_base_description(&self, asset: &AssetId) -> Result<String, LendingError> {
        Ok(self.entry(asset, PriceRole::Borrow)?.description)
    }

    /// Value of `amount` base units of `asset` in quote units ([`VALUE_DECIMALS`] digits)
    pub fn value_of(
        &self,
        role: PriceRole,
        asset: &AssetId,
        amount: u64,
        asset_decimals: u8,
        rounding: Rounding,
        now: Timestamp,
    ) -> Result<u128, LendingError> {
        if amount == 0 {
            return Ok(0);
        }
        let quote = self.price(role, asset, now)?;
        normalize_value(
            amount,
            quote.price,
            asset_decimals,
            quote.decimals,
            VALUE_DECIMALS,
            rounding,
        )
    }
}

/// Direction to round a value that falls between two quote units.
///
/// Solvency checks round collateral down and debt up, so dust never
/// counts in the borrower's favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// `amount * price / 10^(asset_decimals + price_decimals - target_decimals)`
///
/// A negative exponent scales up instead, which is exact.
pub fn normalize_value(
    amount: u64,
    price: u128,
    asset_decimals: u8,
    price_decimals: u8,
    target_decimals: u8,
    rounding: Rounding,
) -> Result<u128, LendingError> {
    let overflow = LendingError::MathOverflow {
        context: "price normalization",
    };
    let raw = (amount as u128).checked_mul(price).ok_or(overflow.clone())?;
    let exponent = asset_decimals as i32 + price_decimals as i32 - target_decimals as i32;

    if exponent >= 0 {
        // Anything past 10^38 exceeds every u128 numerator
        let Some(divisor) = 10u128.checked_pow(exponent as u32) else {
            return Ok(match rounding {
                Rounding::Up if raw > 0 => 1,
                _ => 0,
            });
        };
        Ok(match rounding {
            Rounding::Down => raw / divisor,
            Rounding::Up => raw.div_ceil(divisor),
        })
    } else {
        let factor = 10u128
            .checked_pow(exponent.unsigned_abs())
            .ok_or(overflow.clone())?;
        raw.checked_mul(factor).ok_or(overflow)
    }
}
