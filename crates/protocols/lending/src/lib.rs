//! Lending Pool Implementation
//!
//! This crate implements a single-pair, share-based lending pool.
//!
//! # Protocol Overview
//!
//! - Lenders supply the borrow asset and receive supply shares
//! - Borrowers lock the collateral asset in a per-account position and draw
//!   loans tracked as borrow shares
//! - Interest accrues on every operation and raises the value of both share
//!   kinds without changing share counts
//! - Positions whose debt exceeds `collateral_value * liquidation_threshold`
//!   can be liquidated
//!
//! # Architecture
//!
//! Pricing comes from a shared [`price_feed::PriceFeed`]. Token movement, time,
//! the interest curve and the liquidation payout are pluggable through the
//! [`AssetTransfer`], [`Clock`], [`InterestRateModel`] and
//! [`LiquidationStrategy`] traits.

pub mod calculator;
pub mod clock;
pub mod constants;
pub mod interest;
pub mod liquidation;
pub mod pool;
pub mod position;
pub mod state;
pub mod transfer;

// Re-exports
pub use calculator::*;
pub use clock::*;
pub use interest::*;
pub use liquidation::*;
pub use pool::*;
pub use position::*;
pub use state::*;
pub use transfer::*;
