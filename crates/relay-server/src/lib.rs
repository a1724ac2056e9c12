//! Privacy relay HTTP server
//!
//! Axum routes connecting the browser extension to Stripe, the `pro_users`
//! record store, and the completion API.

pub mod config;
pub mod handlers;
pub mod state;

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

pub use config::AppConfig;
pub use state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/stripe-webhook", post(handlers::stripe_webhook))
        .route(
            "/check-pro",
            get(handlers::check_pro_query).post(handlers::check_pro_body),
        )
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .route("/analyze", post(handlers::analyze))
        .with_state(state)
}

/// CORS for the extension: one exact origin when configured, otherwise any
pub fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(match allowed_origin {
        Some(origin) => {
            let origin: HeaderValue = origin
                .parse()
                .with_context(|| format!("ALLOWED_ORIGIN is not a valid header value: {origin}"))?;
            cors.allow_origin(origin)
        }
        None => cors.allow_origin(Any),
    })
}
