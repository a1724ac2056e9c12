//! Stripe Checkout Integration
//!
//! Creates hosted Checkout sessions for a pre-configured Stripe price. The
//! extension redirects the user to Stripe with the returned session id; the
//! resulting `checkout.session.completed` webhook grants Pro access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems,
};

use crate::error::{PaymentError, Result};

/// Stripe settings
#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,

    /// Price used when a request does not name one
    pub default_price_id: Option<String>,

    pub success_url: String,
    pub cancel_url: String,
}

impl StripeConfig {
    pub const DEFAULT_SUCCESS_URL: &'static str = "https://your-replit-url/success.html";
    pub const DEFAULT_CANCEL_URL: &'static str = "https://your-replit-url/cancel.html";

    /// Build from an environment-style variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret_key = lookup("STRIPE_SECRET_KEY")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let webhook_secret = lookup("STRIPE_WEBHOOK_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PaymentError::Config("STRIPE_WEBHOOK_SECRET not set".into()))?;

        Ok(Self {
            secret_key,
            webhook_secret,
            default_price_id: lookup("STRIPE_PRICE_ID").filter(|v| !v.is_empty()),
            success_url: lookup("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|| Self::DEFAULT_SUCCESS_URL.into()),
            cancel_url: lookup("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|| Self::DEFAULT_CANCEL_URL.into()),
        })
    }
}

/// Request to create a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Stripe price id; falls back to the configured default
    #[serde(default)]
    pub price_id: Option<String>,

    /// Customer email, prefilled on the Stripe page
    pub customer_email: String,
}

/// Result of creating a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Stripe session ID
    pub id: String,

    /// Hosted page URL, when Stripe returns one
    pub url: Option<String>,
}

/// Anything that can open a hosted checkout
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession>;
}

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(config.secret_key.clone()),
            config,
        }
    }

    /// Get the webhook secret
    pub fn webhook_secret(&self) -> &str {
        &self.config.webhook_secret
    }
}

#[async_trait]
impl CheckoutGateway for StripeClient {
    /// Create a subscription-mode Checkout session (Hosted approach)
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        let price_id = request
            .price_id
            .or_else(|| self.config.default_price_id.clone())
            .ok_or_else(|| PaymentError::Config("no priceId given and STRIPE_PRICE_ID not set".into()))?;

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Subscription);
        params.customer_email = Some(&request.customer_email);
        params.success_url = Some(&self.config.success_url);
        params.cancel_url = Some(&self.config.cancel_url);
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price: Some(price_id),
            quantity: Some(1),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        Ok(CheckoutSession {
            id: session.id.to_string(),
            url: session.url,
        })
    }
}
