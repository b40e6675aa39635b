//! Price Feed Implementation
//!
//! This crate implements the oracle registry that lending pools consult for
//! solvency checks.
//!
//! # Overview
//!
//! Each pool asset is priced in one of two roles:
//! - Collateral: the asset borrowers lock up
//! - Borrow: the asset lenders supply and borrowers draw
//!
//! Sources report in their native precision; the feed validates freshness and
//! converts raw token amounts into a common quote unit so values of assets
//! with different decimals can be compared.

pub mod feed;
pub mod source;

pub use feed::*;
pub use source::*;
