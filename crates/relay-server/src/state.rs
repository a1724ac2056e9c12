//! Application State

use std::sync::Arc;

use relay_core::{LlmProvider, PolicyAnalyst, provider::GenerationOptions};
use relay_payments::{
    CheckoutGateway, EntitlementResolver, EntitlementStore, WebhookIngestor, WebhookVerifier,
};

/// Shared application state
///
/// Every external client is built by the caller and passed in, so tests can
/// swap in in-memory stores and canned providers.
#[derive(Clone)]
pub struct AppState {
    /// Pro status lookups (fail closed)
    pub resolver: EntitlementResolver,

    /// Stripe webhook verification + record insert
    pub ingestor: Arc<WebhookIngestor>,

    /// Hosted checkout creation
    pub checkout: Arc<dyn CheckoutGateway>,

    /// Completion passthrough
    pub analyst: Arc<PolicyAnalyst>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EntitlementStore>,
        verifier: WebhookVerifier,
        checkout: Arc<dyn CheckoutGateway>,
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            resolver: EntitlementResolver::new(store.clone()),
            ingestor: Arc::new(WebhookIngestor::new(verifier, store)),
            checkout,
            analyst: Arc::new(PolicyAnalyst::new(provider, options)),
        }
    }
}
