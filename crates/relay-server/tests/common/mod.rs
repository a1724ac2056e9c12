//! Test utilities and fakes for relay-server route tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use hmac::{Hmac, Mac};
use relay_core::{
    LlmProvider, Message, RelayError,
    provider::{Completion, GenerationOptions},
};
use relay_payments::{
    CheckoutGateway, CheckoutRequest, CheckoutSession, EntitlementRecord, EntitlementStore,
    MemoryEntitlementStore, PaymentError, WebhookVerifier,
};
use relay_server::{AppState, router};
use serde_json::Value;
use sha2::Sha256;
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_route_tests";

/// Checkout gateway that records requests instead of calling Stripe
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<CheckoutRequest>>,
    pub fail: bool,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CheckoutGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> relay_payments::Result<CheckoutSession> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(PaymentError::Stripe("No such price: 'price_missing'".into()));
        }
        Ok(CheckoutSession {
            id: "cs_test_123".into(),
            url: Some("https://checkout.stripe.com/c/pay/cs_test_123".into()),
        })
    }
}

/// Completion provider with a fixed reply; `None` simulates a response
/// without choices
pub struct FakeProvider {
    pub reply: Option<String>,
    pub calls: AtomicUsize,
    pub last_user_message: Mutex<Option<String>>,
}

impl FakeProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: AtomicUsize::new(0),
            last_user_message: Mutex::new(None),
        }
    }

    pub fn malformed() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_user_message: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    fn name(&self) -> &str {
        "Fake"
    }

    async fn health_check(&self) -> relay_core::Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> relay_core::Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user_message.lock().unwrap() = messages.last().map(|m| m.content.clone());

        let content = self
            .reply
            .clone()
            .ok_or_else(|| RelayError::MalformedResponse("response had no choices".into()))?;
        Ok(Completion {
            content,
            model: options.model.clone(),
            usage: None,
            finish_reason: None,
        })
    }
}

/// Record store that is always unreachable
pub struct FailingStore;

#[async_trait]
impl EntitlementStore for FailingStore {
    async fn find_pro_flag(&self, _email: &str) -> relay_payments::Result<Option<bool>> {
        Err(PaymentError::Storage("connection refused".into()))
    }

    async fn insert(&self, _record: &EntitlementRecord) -> relay_payments::Result<()> {
        Err(PaymentError::Storage("connection refused".into()))
    }
}

/// Router wired to in-memory collaborators
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryEntitlementStore>,
    pub gateway: Arc<FakeGateway>,
    pub provider: Arc<FakeProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_parts(
            MemoryEntitlementStore::new(),
            FakeGateway::default(),
            FakeProvider::replying("**Red flags**\n- Location data is collected."),
        )
    }

    pub fn with_parts(
        store: MemoryEntitlementStore,
        gateway: FakeGateway,
        provider: FakeProvider,
    ) -> Self {
        let store = Arc::new(store);
        let gateway = Arc::new(gateway);
        let provider = Arc::new(provider);

        let state = AppState::new(
            store.clone(),
            WebhookVerifier::new(WEBHOOK_SECRET),
            gateway.clone(),
            provider.clone(),
            GenerationOptions::default(),
        );

        Self {
            router: router(state),
            store,
            gateway,
            provider,
        }
    }

    /// Send a request and decode the JSON response body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

/// Router whose record store always fails
pub fn app_with_failing_store() -> Router {
    let state = AppState::new(
        Arc::new(FailingStore),
        WebhookVerifier::new(WEBHOOK_SECRET),
        Arc::new(FakeGateway::default()),
        Arc::new(FakeProvider::replying("ok")),
        GenerationOptions::default(),
    );
    router(state)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// `stripe-signature` header value for `payload`, signed now
pub fn sign(payload: &[u8]) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

pub fn webhook_request(payload: &[u8], signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/stripe-webhook")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("stripe-signature", sig);
    }
    builder.body(Body::from(payload.to_vec())).unwrap()
}
