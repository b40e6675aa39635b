//! Tracrafter-api: HTTP monitoring API for Tracrafter
//!
//! Exposes read-only views of a lending pool: totals, rates, lender stakes
//! and borrower positions.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{AppState, StateError};
