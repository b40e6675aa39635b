//! Error types for Tracrafter

use thiserror::Error;

/// Top-level errors that can occur in Tracrafter
#[derive(Debug, Error)]
pub enum Error {
    #[error("Lending error: {0}")]
    Lending(#[from] LendingError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures reported by the lending pool, the position ledger and the price feed.
///
/// Every mutating pool operation either applies fully or fails with exactly one
/// of these kinds and leaves no partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LendingError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Insufficient shares: need {required}, have {available}")]
    InsufficientShares { required: u64, available: u64 },

    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    #[error("Insufficient collateral: requested {requested}, available {available}")]
    InsufficientCollateral { requested: u64, available: u64 },

    #[error("Position undercollateralized: debt value {debt_value} exceeds borrowing power {max_debt_value}")]
    Undercollateralized {
        debt_value: u128,
        max_debt_value: u128,
    },

    #[error("No position for {owner}")]
    PositionNotFound { owner: String },

    #[error("No {role} price feed registered for {asset}")]
    FeedNotFound { asset: String, role: String },

    #[error("Stale or invalid price for {asset}: {reason}")]
    StaleOrInvalidPrice { asset: String, reason: String },

    #[error("Position of {owner} is healthy and cannot be liquidated")]
    NotLiquidatable { owner: String },

    #[error("Repay amount {requested} exceeds outstanding debt {outstanding}")]
    ExceedsDebt { requested: u64, outstanding: u64 },

    #[error("Transfer of {asset} failed: {reason}")]
    TransferFailed { asset: String, reason: String },

    #[error("{caller} is not allowed to {action}")]
    Unauthorized { caller: String, action: String },

    #[error("Re-entrant call into {operation} while another operation is in progress")]
    ReentrantCall { operation: &'static str },

    #[error("Arithmetic overflow in {context}")]
    MathOverflow { context: &'static str },
}

/// Result type alias for Tracrafter operations
pub type Result<T> = std::result::Result<T, Error>;

impl LendingError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "zero_amount",
            Self::InsufficientShares { .. } => "insufficient_shares",
            Self::InsufficientLiquidity { .. } => "insufficient_liquidity",
            Self::InsufficientCollateral { .. } => "insufficient_collateral",
            Self::Undercollateralized { .. } => "undercollateralized",
            Self::PositionNotFound { .. } => "position_not_found",
            Self::FeedNotFound { .. } => "feed_not_found",
            Self::StaleOrInvalidPrice { .. } => "stale_or_invalid_price",
            Self::NotLiquidatable { .. } => "not_liquidatable",
            Self::ExceedsDebt { .. } => "exceeds_debt",
            Self::TransferFailed { .. } => "transfer_failed",
            Self::Unauthorized { .. } => "unauthorized",
            Self::ReentrantCall { .. } => "reentrant_call",
            Self::MathOverflow { .. } => "math_overflow",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ZeroAmount => 400,
            Self::PositionNotFound { .. } | Self::FeedNotFound { .. } => 404,
            Self::Unauthorized { .. } => 403,
            Self::ReentrantCall { .. } => 409,
            Self::InsufficientShares { .. }
            | Self::InsufficientLiquidity { .. }
            | Self::InsufficientCollateral { .. }
            | Self::Undercollateralized { .. }
            | Self::NotLiquidatable { .. }
            | Self::ExceedsDebt { .. }
            | Self::TransferFailed { .. } => 422,
            Self::StaleOrInvalidPrice { .. } => 503,
            Self::MathOverflow { .. } => 500,
        }
    }
}
