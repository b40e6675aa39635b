//! Asset Movement
//!
//! The pool never moves tokens itself; it asks an [`AssetTransfer`]
//! implementation to pull assets in from an account or push them out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracrafter_core::{Address, AssetId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("{account} holds {available} of {asset}, needs {required}")]
    InsufficientBalance {
        asset: String,
        account: String,
        required: u64,
        available: u64,
    },

    #[error("Pool custody holds {available} of {asset}, needs {required}")]
    InsufficientCustody {
        asset: String,
        required: u64,
        available: u64,
    },

    #[error("Balance overflow for {0}")]
    Overflow(String),

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Token movement between accounts and the pool
pub trait AssetTransfer: Send + Sync {
    /// Move `amount` of `asset` from `from` into pool custody
    fn transfer_in(&mut self, asset: &AssetId, from: &Address, amount: u64)
        -> Result<(), TransferError>;

    /// Move `amount` of `asset` from pool custody to `to`
    fn transfer_out(&mut self, asset: &AssetId, to: &Address, amount: u64)
        -> Result<(), TransferError>;
}

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<(AssetId, Address), u64>,
    custody: HashMap<AssetId, u64>,
}

/// In-process token ledger.
///
/// Clones share the same balances, so a test or embedding application can
/// keep a handle while the pool owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    inner: Arc<Mutex<LedgerInner>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Credit `amount` of `asset` to `account` out of thin air
    pub fn mint(&self, asset: &AssetId, account: &Address, amount: u64) -> Result<(), TransferError> {
        let mut inner = self.lock();
        let balance = inner
            .balances
            .entry((asset.clone(), account.clone()))
            .or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow(account.to_string()))?;
        Ok(())
    }

    pub fn balance_of(&self, asset: &AssetId, account: &Address) -> u64 {
        self.lock()
            .balances
            .get(&(asset.clone(), account.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Amount of `asset` held by the pool
    pub fn custody_of(&self, asset: &AssetId) -> u64 {
        self.lock().custody.get(asset).copied().unwrap_or(0)
    }
}

impl AssetTransfer for InMemoryLedger {
    fn transfer_in(
        &mut self,
        asset: &AssetId,
        from: &Address,
        amount: u64,
    ) -> Result<(), TransferError> {
        let mut inner = self.lock();
        let key = (asset.clone(), from.clone());
        let available = inner.balances.get(&key).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                asset: asset.to_string(),
                account: from.to_string(),
                required: amount,
                available,
            });
        }
        let custody = inner.custody.get(asset).copied().unwrap_or(0);
        let custody = custody
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow(asset.to_string()))?;

        inner.balances.insert(key, available - amount);
        inner.custody.insert(asset.clone(), custody);
        Ok(())
    }

    fn transfer_out(
        &mut self,
        asset: &AssetId,
        to: &Address,
        amount: u64,
    ) -> Result<(), TransferError> {
        let mut inner = self.lock();
        let available = inner.custody.get(asset).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientCustody {
                asset: asset.to_string(),
                required: amount,
                available,
            });
        }
        let key = (asset.clone(), to.clone());
        let balance = inner.balances.get(&key).copied().unwrap_or(0);
        let balance = balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow(to.to_string()))?;

        inner.custody.insert(asset.clone(), available - amount);
        inner.balances.insert(key, balance);
        Ok(())
    }
}
