//! Borrower Positions
//!
//! Positions live in an arena owned by the pool, addressed by [`PositionId`]
//! and looked up through an owner index. A position is created on the first
//! collateral deposit and never removed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracrafter_core::{Address, LendingError};

/// Slot of a position inside a [`PositionBook`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(pub usize);

/// One borrower's collateral and debt shares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    owner: Address,
    collateral_balance: u64,
    borrow_shares: u64,
}

impl Position {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            collateral_balance: 0,
            borrow_shares: 0,
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn collateral_balance(&self) -> u64 {
        self.collateral_balance
    }

    pub fn borrow_shares(&self) -> u64 {
        self.borrow_shares
    }

    pub fn has_debt(&self) -> bool {
        self.borrow_shares > 0
    }

    pub(crate) fn add_collateral(&mut self, amount: u64) -> Result<(), LendingError> {
        self.collateral_balance = self
            .collateral_balance
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow {
                context: "collateral balance",
            })?;
        Ok(())
    }

    pub(crate) fn remove_collateral(&mut self, amount: u64) -> Result<(), LendingError> {
        if amount > self.collateral_balance {
            return Err(LendingError::InsufficientCollateral {
                requested: amount,
                available: self.collateral_balance,
            });
        }
        self.collateral_balance -= amount;
        Ok(())
    }

    pub(crate) fn set_borrow_shares(&mut self, shares: u64) {
        self.borrow_shares = shares;
    }
}

/// Arena of positions plus an owner index
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    slots: Vec<Position>,
    index: HashMap<Address, PositionId>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing position for `owner`, or a fresh zeroed one
    pub fn get_or_create(&mut self, owner: &Address) -> PositionId {
        if let Some(id) = self.index.get(owner) {
            return *id;
        }
        let id = PositionId(self.slots.len());
        self.slots.push(Position::new(owner.clone()));
        self.index.insert(owner.clone(), id);
        tracing::debug!(owner = %owner, slot = id.0, "Created position");
        id
    }

    pub fn id_of(&self, owner: &Address) -> Option<PositionId> {
        self.index.get(owner).copied()
    }

    pub fn get(&self, id: PositionId) -> Option<&Position> {
        self.slots.get(id.0)
    }

    pub fn by_owner(&self, owner: &Address) -> Option<&Position> {
        self.id_of(owner).and_then(|id| self.get(id))
    }

    pub(crate) fn get_mut(&mut self, id: PositionId) -> Option<&mut Position> {
        self.slots.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.slots.iter()
    }

    pub fn total_borrow_shares(&self) -> u128 {
        self.slots.iter().map(|p| p.borrow_shares as u128).sum()
    }

    /// Put `owner`'s record back to a checkpointed value.
    ///
    /// `None` means the position did not exist at the checkpoint; it is only
    /// dropped when it still occupies the last slot, which holds for anything
    /// created inside the operation being undone.
    pub(crate) fn restore(&mut self, owner: &Address, saved: Option<Position>) {
        match saved {
            Some(position) => {
                if let Some(id) = self.id_of(owner) {
                    self.slots[id.0] = position;
                }
            }
            None => {
                if let Some(id) = self.index.get(owner).copied() {
                    if id.0 + 1 == self.slots.len() {
                        self.slots.pop();
                        self.index.remove(owner);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::new("alice")
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut book = PositionBook::new();
        let first = book.get_or_create(&alice());
        let second = book.get_or_create(&alice());
        assert_eq!(first, second);
        assert_eq!(book.len(), 1);

        let bob = book.get_or_create(&Address::new("bob"));
        assert_eq!(bob, PositionId(1));
        assert_eq!(book.by_owner(&alice()).unwrap().collateral_balance(), 0);
    }

    #[test]
    fn test_collateral_adjustments() {
        let mut position = Position::new(alice());
        position.add_collateral(100).unwrap();
        position.remove_collateral(40).unwrap();
        assert_eq!(position.collateral_balance(), 60);

        let err = position.remove_collateral(61).unwrap_err();
        assert_eq!(
            err,
            LendingError::InsufficientCollateral {
                requested: 61,
                available: 60
            }
        );
        assert_eq!(position.collateral_balance(), 60);

        position.add_collateral(u64::MAX - 60).unwrap();
        assert!(position.add_collateral(1).is_err());
    }

    #[test]
    fn test_restore_existing_and_new() {
        let mut book = PositionBook::new();
        let id = book.get_or_create(&alice());
        let saved = book.get(id).cloned();

        book.get_mut(id).unwrap().add_collateral(5).unwrap();
        book.get_mut(id).unwrap().set_borrow_shares(3);
        book.restore(&alice(), saved);
        assert_eq!(book.by_owner(&alice()).unwrap(), &Position::new(alice()));

        let bob = Address::new("bob");
        book.get_or_create(&bob);
        book.restore(&bob, None);
        assert!(book.by_owner(&bob).is_none());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_total_borrow_shares() {
        let mut book = PositionBook::new();
        let a = book.get_or_create(&alice());
        let b = book.get_or_create(&Address::new("bob"));
        book.get_mut(a).unwrap().set_borrow_shares(7);
        book.get_mut(b).unwrap().set_borrow_shares(5);
        assert_eq!(book.total_borrow_shares(), 12);
        assert!(book.iter().all(|p| p.has_debt()));
    }
}
