//! Stripe Webhook Handling
//!
//! Verifies Stripe's signature over the raw request bytes, then records Pro
//! entitlement for completed checkouts.
//!
//! ```text
//! raw bytes + header ──▶ verify ──▶ parse ──▶ filter ──▶ extract email ──▶ insert
//!                          │          │         │              │             │
//!                         400        400    200 ignored       400        500 / 200
//! ```
//!
//! Verification must see the exact bytes Stripe signed, so nothing may parse
//! or re-serialize the body before `WebhookVerifier::verify` runs.

use std::sync::Arc;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::entitlement::EntitlementRecord;
use crate::error::{PaymentError, Result};
use crate::store::EntitlementStore;

type HmacSha256 = Hmac<Sha256>;

/// Event type that grants Pro access
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Stripe signature checker for `stripe-signature` headers
///
/// Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=...][,v0=...]`. The
/// signed payload is `<t>.<raw body>`.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    /// Stripe's default tolerance for signature timestamps
    pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: Self::DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Verify against the current clock
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<()> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    /// Verify as of `now` (unix seconds)
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<()> {
        let mut timestamp = None;
        let mut candidates = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", t)) => timestamp = Some(t),
                Some(("v1", sig)) => candidates.push(sig),
                _ => {}
            }
        }

        let timestamp_str = timestamp.ok_or_else(|| {
            PaymentError::WebhookSignature("Unable to extract timestamp and signatures from header".into())
        })?;
        if candidates.is_empty() {
            return Err(PaymentError::WebhookSignature(
                "No signatures found with expected scheme".into(),
            ));
        }

        let signed_at: i64 = timestamp_str
            .parse()
            .map_err(|_| PaymentError::WebhookSignature("Invalid timestamp in header".into()))?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| PaymentError::Config("invalid webhook secret".into()))?;
        mac.update(timestamp_str.as_bytes());
        mac.update(b".");
        mac.update(payload);

        let matched = candidates.iter().any(|sig| {
            hex::decode(sig).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
        });
        if !matched {
            return Err(PaymentError::WebhookSignature(
                "No signatures found matching the expected signature for payload".into(),
            ));
        }

        if now.saturating_sub(signed_at) > self.tolerance_secs {
            return Err(PaymentError::WebhookSignature(
                "Timestamp outside the tolerance zone".into(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct StripeEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

/// The parts of a Checkout Session this relay reads
#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

/// What an accepted webhook did
#[derive(Clone, Debug)]
pub enum WebhookOutcome {
    /// Checkout completed and a Pro record was inserted
    Recorded { record: EntitlementRecord },

    /// Verified event of a type this relay does not act on
    Ignored { event_type: String },
}

/// Verifies and consumes Stripe webhook deliveries
pub struct WebhookIngestor {
    verifier: WebhookVerifier,
    store: Arc<dyn EntitlementStore>,
}

impl WebhookIngestor {
    pub fn new(verifier: WebhookVerifier, store: Arc<dyn EntitlementStore>) -> Self {
        Self { verifier, store }
    }

    /// Process one delivery.
    ///
    /// Every call is independent. Delivering the same completed checkout twice
    /// inserts two rows; the store does not upsert by email.
    pub async fn ingest(&self, raw_body: &[u8], signature: &str) -> Result<WebhookOutcome> {
        self.verifier.verify(raw_body, signature)?;

        let event: StripeEvent = serde_json::from_slice(raw_body)
            .map_err(|e| PaymentError::WebhookParse(e.to_string()))?;

        tracing::info!(
            event_id = event.id.as_deref().unwrap_or("-"),
            event_type = %event.event_type,
            "Processing Stripe webhook"
        );

        if event.event_type != CHECKOUT_COMPLETED {
            tracing::debug!(event_type = %event.event_type, "Unhandled webhook event");
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type,
            });
        }

        let session: CheckoutSessionObject = serde_json::from_value(event.data.object)
            .map_err(|e| PaymentError::WebhookParse(format!("checkout session: {e}")))?;

        let email = session
            .customer_details
            .and_then(|d| d.email)
            .filter(|e| !e.is_empty());

        let Some(email) = email else {
            tracing::warn!(session_id = ?session.id, "No email found in checkout session");
            return Err(PaymentError::MissingEmail);
        };

        tracing::info!(email = %email, session_id = ?session.id, "Stripe checkout complete");

        let record = EntitlementRecord::pro(email);
        self.store.insert(&record).await.inspect_err(|e| {
            tracing::error!(email = %record.email, error = %e, "Record store insert failed");
        })?;

        tracing::info!(email = %record.email, "Pro user saved");

        Ok(WebhookOutcome::Recorded { record })
    }
}
