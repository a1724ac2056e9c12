//! HTTP Handlers
//!
//! Every failure is answered with a JSON body so the extension can render a
//! message. Missing or unparseable JSON bodies count as an empty object and
//! fall through to the same "missing field" responses.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
};
use relay_core::RelayError;
use relay_payments::{CheckoutRequest, PaymentError, WebhookOutcome};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Body of `GET /`
pub const LIVENESS_MESSAGE: &str = "🧠 Privacy GPT API is live with Email-Based Pro Access";

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &'static str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code,
        }),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckProRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckProResponse {
    pub is_pro: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    #[serde(default)]
    pub price_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutResponse {
    pub session_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub selected_text: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub summary: String,
}

/// Empty strings count as absent
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn json_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable JSON body; treating as empty");
            T::default()
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness probe
pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

/// `GET /check-pro?email=...`
pub async fn check_pro_query(
    State(state): State<AppState>,
    params: Result<Query<CheckProRequest>, QueryRejection>,
) -> (StatusCode, Json<CheckProResponse>) {
    let email = params.map(|Query(p)| p.email).unwrap_or_default();
    check_pro(&state, email).await
}

/// `POST /check-pro` with `{ "email": ... }`
pub async fn check_pro_body(
    State(state): State<AppState>,
    payload: Result<Json<CheckProRequest>, JsonRejection>,
) -> (StatusCode, Json<CheckProResponse>) {
    check_pro(&state, json_or_default(payload).email).await
}

async fn check_pro(state: &AppState, email: Option<String>) -> (StatusCode, Json<CheckProResponse>) {
    let Some(email) = present(email) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(CheckProResponse {
                is_pro: false,
                error: Some("Missing email".into()),
            }),
        );
    };

    let is_pro = state.resolver.is_entitled(&email).await;

    (
        StatusCode::OK,
        Json(CheckProResponse {
            is_pro,
            error: None,
        }),
    )
}

/// Stripe webhook handler
///
/// Takes the body as raw bytes: the signature covers the exact payload.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Webhook rejected: missing stripe-signature header");
            api_error(
                StatusCode::BAD_REQUEST,
                "Missing Stripe signature",
                "MISSING_SIGNATURE",
            )
        })?;

    match state.ingestor.ingest(&body, signature).await {
        Ok(WebhookOutcome::Recorded { record }) => {
            tracing::info!(email = %record.email, "Webhook recorded Pro user");
            Ok(Json(WebhookAck { received: true }))
        }
        Ok(WebhookOutcome::Ignored { event_type }) => {
            tracing::debug!(event_type = %event_type, "Webhook acknowledged without action");
            Ok(Json(WebhookAck { received: true }))
        }
        Err(e) => Err(webhook_error(&e)),
    }
}

fn webhook_error(err: &PaymentError) -> ApiError {
    match err {
        PaymentError::WebhookSignature(msg) => {
            tracing::warn!("Webhook verification failed: {}", msg);
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Webhook Error: {msg}"),
                "INVALID_SIGNATURE",
            )
        }
        PaymentError::WebhookParse(msg) => {
            tracing::warn!("Webhook payload rejected: {}", msg);
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Webhook Error: {msg}"),
                "INVALID_PAYLOAD",
            )
        }
        PaymentError::MissingEmail => {
            api_error(StatusCode::BAD_REQUEST, err.user_message(), "MISSING_EMAIL")
        }
        _ => {
            tracing::error!("Webhook processing error: {}", err);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store Pro user",
                "STORE_ERROR",
            )
        }
    }
}

/// Create Stripe checkout session
pub async fn create_checkout_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateCheckoutRequest>, JsonRejection>,
) -> Result<Json<CreateCheckoutResponse>, ApiError> {
    let payload = json_or_default(payload);

    let email = present(payload.email)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing email", "MISSING_EMAIL"))?;

    let request = CheckoutRequest {
        price_id: present(payload.price_id),
        customer_email: email,
    };

    let session = state
        .checkout
        .create_checkout_session(request)
        .await
        .map_err(|e| {
            tracing::error!("Stripe checkout error: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create checkout session",
                "CHECKOUT_ERROR",
            )
        })?;

    Ok(Json(CreateCheckoutResponse {
        session_id: session.id,
    }))
}

/// Policy analysis passthrough
///
/// Pro status is looked up and logged but does not gate the call.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let payload = json_or_default(payload);

    let (Some(selected_text), Some(email)) =
        (present(payload.selected_text), present(payload.email))
    else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing selectedText or email",
            "MISSING_FIELDS",
        ));
    };

    if state.resolver.is_entitled(&email).await {
        tracing::info!(email = %email, "Pro access granted");
    } else {
        tracing::info!(email = %email, "Free user");
    }

    let summary = state.analyst.summarize(&selected_text).await.map_err(|e| {
        tracing::error!("Completion API error: {}", e);
        let status = match e {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, e.user_message(), "ANALYZE_ERROR")
    })?;

    Ok(Json(AnalyzeResponse { summary }))
}
