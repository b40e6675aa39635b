//! Health check endpoint

use axum::{extract::State, Json};

use crate::dto::HealthResponse;
use crate::AppState;

/// GET /health - Check API health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pool = &state.config().pool;
    Json(HealthResponse::ok(format!(
        "{}/{}",
        pool.collateral.symbol, pool.borrow.symbol
    )))
}
