//! HTTP server setup and configuration
//!
//! Every route is a GET view, so cross-origin callers are only offered GET.

use std::net::SocketAddr;

use axum::http::{header, Method};
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes::create_router;
use crate::AppState;

/// Monitoring router wrapped in request tracing and a GET-only CORS policy
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE]);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve the monitoring API on localhost until Ctrl-C
pub async fn start_server(state: AppState, port: u16) -> Result<(), std::io::Error> {
    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Monitoring API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Monitoring API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use tracrafter_core::{
        Address, AppConfig, InterestRateConfig, PriceRole, StaticPriceConfig,
    };

    const LENDER: &str = "0x00000000000000000000000000000000000000aa";
    const BORROWER: &str = "0x00000000000000000000000000000000000000bb";
    const USDC: u64 = 1_000_000;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.pool.interest_rate = InterestRateConfig::Fixed {
            annual_rate_bps: 500,
        };
        config.prices = vec![
            StaticPriceConfig {
                label: "WBTC/USD".into(),
                asset: config.pool.collateral.id.clone(),
                role: PriceRole::Collateral,
                price: 9_000_000_000_000,
                decimals: 8,
            },
            StaticPriceConfig {
                label: "USDC/USD".into(),
                asset: config.pool.borrow.id.clone(),
                role: PriceRole::Borrow,
                price: 100_000_000,
                decimals: 8,
            },
        ];
        config
    }

    /// Lender supplies 10,000 USDC; borrower locks 1 WBTC and draws 9,000 USDC
    async fn active_state() -> AppState {
        let state = AppState::from_config(config()).unwrap();
        let (lender, borrower) = (Address::new(LENDER), Address::new(BORROWER));
        let pool_config = state.config().pool.clone();
        state
            .ledger()
            .mint(&pool_config.borrow.id, &lender, 10_000 * USDC)
            .unwrap();
        state
            .ledger()
            .mint(&pool_config.collateral.id, &borrower, 100_000_000)
            .unwrap();

        let handle = state.pool_handle();
        let mut pool = handle.write().await;
        pool.supply(&lender, 10_000 * USDC).unwrap();
        pool.supply_collateral_by_position(&borrower, 100_000_000)
            .unwrap();
        pool.borrow_by_position(&borrower, 9_000 * USDC).unwrap();
        drop(pool);
        state
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
        let response = create_app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let state = AppState::from_config(config()).unwrap();
        let (status, body) = get(state, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["pool"], "WBTC/USDC");
    }

    #[tokio::test]
    async fn test_pool_snapshot() {
        let (status, body) = get(active_state().await, "/pool").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_supply_assets"], 10_000 * USDC);
        assert_eq!(body["total_borrow_assets"], 9_000 * USDC);
        assert_eq!(body["utilization_bps"], 9_000);
        assert_eq!(body["borrow_rate_bps"], 500);
        assert_eq!(body["position_count"], 1);
    }

    #[tokio::test]
    async fn test_supply_view() {
        let uri = format!("/pool/supply/{LENDER}");
        let (status, body) = get(active_state().await, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shares"], 10_000 * USDC);
        assert_eq!(body["assets"], 10_000 * USDC);
    }

    #[tokio::test]
    async fn test_position_view() {
        let uri = format!("/pool/positions/{BORROWER}");
        let (status, body) = get(active_state().await, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["collateral_balance"], 100_000_000);
        assert_eq!(body["debt_assets"], 9_000 * USDC);
        assert_eq!(body["health"]["health_factor_bps"], 80_000);
        assert_eq!(body["health"]["liquidatable"], false);
    }

    #[tokio::test]
    async fn test_missing_position_is_not_found() {
        let uri = format!("/pool/positions/{LENDER}");
        let (status, body) = get(active_state().await, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "position_not_found");
    }

    #[tokio::test]
    async fn test_malformed_address_rejected() {
        let state = AppState::from_config(config()).unwrap();
        let (status, body) = get(state, "/pool/supply/not-an-address").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "bad_request");
    }

    #[tokio::test]
    async fn test_cors_preflight_offers_get_only() {
        let state = AppState::from_config(config()).unwrap();
        let response = create_app(state)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/pool")
                    .header(header::ORIGIN, "https://dashboard.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert_eq!(methods, "GET");
    }

    #[tokio::test]
    async fn test_write_methods_not_routed() {
        let state = AppState::from_config(config()).unwrap();
        let response = create_app(state)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/pool")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_non_positive_static_price_rejected() {
        let mut config = config();
        config.prices[0].price = 0;
        assert!(AppState::from_config(config).is_err());
    }
}
