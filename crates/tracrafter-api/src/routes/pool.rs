//! Lending Pool API Routes
//!
//! Read-only endpoints over the pool state:
//! - GET /pool - Totals, utilization and rates
//! - GET /pool/supply/:account - Lender's shares and redeemable assets
//! - GET /pool/positions/:owner - Borrower's position and health

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use lending::{PoolSnapshot, SupplySnapshot};
use tracrafter_core::Address;

use crate::dto::{ApiError, ApiFailure, PositionResponse};
use crate::AppState;

/// Create pool router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_pool))
        .route("/supply/:account", get(get_supply))
        .route("/positions/:owner", get(get_position))
}

fn parse_address(raw: &str) -> Result<Address, ApiFailure> {
    Address::parse(raw).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request(e.to_string())),
        )
    })
}

/// GET /pool - Pool snapshot
async fn get_pool(State(state): State<AppState>) -> Json<PoolSnapshot> {
    Json(state.pool().await.snapshot())
}

/// GET /pool/supply/:account - Lender's stake
async fn get_supply(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Result<Json<SupplySnapshot>, ApiFailure> {
    let account = parse_address(&account)?;
    let pool = state.pool().await;
    pool.supply_snapshot(&account)
        .map(Json)
        .map_err(|e| ApiError::from_lending(&e))
}

/// GET /pool/positions/:owner - Borrower's position
async fn get_position(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<PositionResponse>, ApiFailure> {
    let owner = parse_address(&owner)?;
    let pool = state.pool().await;

    let position = pool
        .position_snapshot(&owner)
        .map_err(|e| ApiError::from_lending(&e))?;
    let health = pool.position_health(&owner).map_err(|e| {
        tracing::warn!(owner = %owner, error = %e, "Cannot price position");
        ApiError::from_lending(&e)
    })?;

    Ok(Json(PositionResponse { position, health }))
}
