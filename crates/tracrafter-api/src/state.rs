//! Application state shared across API handlers

use std::sync::Arc;

use lending::{InMemoryLedger, LendingPool, SystemClock};
use price_feed::{FixedPriceSource, PriceFeed};
use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracrafter_core::{AppConfig, LendingError};

/// Errors that can occur while assembling the API state
#[derive(Debug, Error)]
pub enum StateError {
    /// Configuration failed validation or pool construction
    #[error(transparent)]
    Core(#[from] tracrafter_core::Error),

    /// A configured static price could not be registered
    #[error("Failed to register price {label}: {source}")]
    PriceRegistration {
        label: String,
        #[source]
        source: LendingError,
    },
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: Arc<RwLock<LendingPool>>,
    ledger: InMemoryLedger,
}

impl AppState {
    /// Build a pool from configuration.
    ///
    /// Static prices are registered as labeled feeds and bound to their asset
    /// role. Tokens move through an in-memory ledger and time is the system
    /// clock.
    pub fn from_config(config: AppConfig) -> Result<Self, StateError> {
        config.validate()?;

        let feed = Arc::new(PriceFeed::new(
            config.admin.clone(),
            config.pool.max_price_age_secs,
        ));
        for price in &config.prices {
            let register = || -> Result<(), LendingError> {
                let source = FixedPriceSource::new(
                    price.price,
                    price.decimals,
                    format!("{} (static)", price.label),
                );
                feed.add_price_feed(&config.admin, price.label.clone(), Arc::new(source))?;
                feed.bind_pair_by_label(&config.admin, price.asset.clone(), price.role, &price.label)
            };
            register().map_err(|source| StateError::PriceRegistration {
                label: price.label.clone(),
                source,
            })?;
        }

        let ledger = InMemoryLedger::new();
        let pool = LendingPool::new(
            config.pool.clone(),
            feed,
            Box::new(ledger.clone()),
            Arc::new(SystemClock),
        )?;

        tracing::info!(
            collateral = %config.pool.collateral.symbol,
            borrow = %config.pool.borrow.symbol,
            prices = config.prices.len(),
            "Initialized API state"
        );
        Ok(Self::with_pool(config, pool, ledger))
    }

    /// Wrap an existing pool
    pub fn with_pool(config: AppConfig, pool: LendingPool, ledger: InMemoryLedger) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool: Arc::new(RwLock::new(pool)),
                ledger,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Read access for handlers
    pub async fn pool(&self) -> RwLockReadGuard<'_, LendingPool> {
        self.inner.pool.read().await
    }

    /// Shared handle for the embedding application, which drives mutations
    pub fn pool_handle(&self) -> Arc<RwLock<LendingPool>> {
        self.inner.pool.clone()
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.inner.ledger
    }
}
