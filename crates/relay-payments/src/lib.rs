//! # relay-payments
//!
//! Subscription entitlement for the privacy relay: Stripe Checkout, Stripe
//! webhook ingestion, and the `pro_users` record store.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  checkout   ┌─────────────────┐  webhook   ┌──────────────┐
//! │  Extension  │────────────▶│  Stripe Hosted  │───────────▶│   Ingestor   │
//! │             │             │  Checkout Page  │            │  (verify +   │
//! └─────────────┘             └─────────────────┘            │   insert)    │
//!        │                                                   └──────┬───────┘
//!        │ check-pro          ┌─────────────────┐                   │
//!        └───────────────────▶│    Resolver     │◀──── pro_users ───┘
//!                             └─────────────────┘
//! ```
//!
//! The record store is append-only. Replaying a completed-checkout webhook
//! inserts a second row for the same email, and the single-row lookup then
//! reports a store error, which the resolver treats as "not entitled".
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_payments::{
//!     EntitlementResolver, SupabaseConfig, SupabaseStore, WebhookIngestor, WebhookVerifier,
//! };
//!
//! let store = Arc::new(SupabaseStore::new(SupabaseConfig::new(url, anon_key))?);
//! let resolver = EntitlementResolver::new(store.clone());
//! let ingestor = WebhookIngestor::new(WebhookVerifier::new("whsec_xxx"), store);
//!
//! let is_pro = resolver.is_entitled("user@example.com").await;
//! ```

mod checkout;
mod entitlement;
mod error;
mod store;
mod supabase;
mod webhook;

pub use checkout::{CheckoutGateway, CheckoutRequest, CheckoutSession, StripeClient, StripeConfig};
pub use entitlement::{Entitlement, EntitlementRecord, EntitlementResolver};
pub use error::{PaymentError, Result};
pub use store::{EntitlementStore, MemoryEntitlementStore};
pub use supabase::{SupabaseConfig, SupabaseStore};
pub use webhook::{CHECKOUT_COMPLETED, WebhookIngestor, WebhookOutcome, WebhookVerifier};
