//! Privacy relay HTTP server
//!
//! Axum-based server relaying the browser extension's requests to Stripe,
//! the hosted `pro_users` table and the completion API.

use std::sync::Arc;

use relay_core::LlmProvider;
use relay_payments::{CheckoutGateway, EntitlementStore, StripeClient, SupabaseStore, WebhookVerifier};
use relay_runtime::OpenAiProvider;
use relay_server::{AppConfig, AppState, cors_layer, router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG may come from .env
    let config = AppConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Completion provider
    let provider = Arc::new(OpenAiProvider::from_config(config.openai.clone())?);
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Completion API reachable ({})", config.openai.base_url),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Completion API not reachable - /analyze will fail");
            tracing::warn!("  Check OPENAI_API_KEY and OPENAI_BASE_URL");
        }
    }

    // Record store + payments
    let store: Arc<dyn EntitlementStore> = Arc::new(SupabaseStore::new(config.supabase.clone())?);
    tracing::info!(
        "✓ Record store: {}/rest/v1/{}",
        config.supabase.url,
        config.supabase.table
    );

    let stripe = StripeClient::new(config.stripe.clone());
    let verifier = WebhookVerifier::new(stripe.webhook_secret());
    let checkout: Arc<dyn CheckoutGateway> = Arc::new(stripe);
    tracing::info!("✓ Stripe configured");

    let state = AppState::new(
        store,
        verifier,
        checkout,
        provider,
        config.openai.generation_options(),
    );

    let cors = cors_layer(config.allowed_origin.as_deref())?;
    match &config.allowed_origin {
        Some(origin) => tracing::info!("CORS restricted to {}", origin),
        None => tracing::warn!("⚠ ALLOWED_ORIGIN not set - accepting any origin"),
    }

    let app = router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 privacy relay running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                        - Liveness");
    tracing::info!("  POST /stripe-webhook          - Stripe events");
    tracing::info!("  GET  /check-pro?email=        - Pro status");
    tracing::info!("  POST /check-pro               - Pro status");
    tracing::info!("  POST /create-checkout-session - Start Stripe checkout");
    tracing::info!("  POST /analyze                 - Privacy policy analysis");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
