//! Data Transfer Objects for API responses

use axum::{http::StatusCode, Json};
use lending::{PositionHealth, PositionSnapshot};
use serde::{Deserialize, Serialize};
use tracrafter_core::LendingError;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Asset pair served, e.g. "WBTC/USDC"
    pub pool: String,
}

impl HealthResponse {
    pub fn ok(pool: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            pool: pool.into(),
        }
    }
}

/// Borrower position with its oracle-priced health
#[derive(Debug, Clone, Serialize)]
pub struct PositionResponse {
    #[serde(flatten)]
    pub position: PositionSnapshot,
    pub health: PositionHealth,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Handler error: status plus JSON body
pub type ApiFailure = (StatusCode, Json<ApiError>);

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    /// Map a pool error onto its status code
    pub fn from_lending(err: &LendingError) -> ApiFailure {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(Self::new(err.error_code(), err.to_string())))
    }
}
