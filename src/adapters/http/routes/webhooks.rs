//! Stripe webhook intake.
//!
//! Processed events are always acknowledged with 200: the downstream
//! handlers are best-effort and duplicate delivery is the recovery path.
//! Only malformed requests (bad signature, bad payload) are rejected.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use secrecy::ExposeSecret;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    infra::stripe_client::verify_webhook_signature,
};

/// POST /api/billing/webhook
async fn handle_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<StatusCode> {
    let webhook_secret = app_state
        .config
        .stripe_webhook_secret
        .as_ref()
        .ok_or(AppError::ProviderNotConfigured)?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidInput("Missing Stripe signature".into()))?;

    verify_webhook_signature(&body, signature, webhook_secret.expose_secret())?;

    let event: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {}", e)))?;

    let event_type = event["type"].as_str().unwrap_or("");
    let event_id = event["id"].as_str().unwrap_or("");

    match event_type {
        "customer.subscription.created"
        | "customer.subscription.updated"
        | "customer.subscription.deleted" => {
            app_state
                .subscription_sync_use_cases
                .handle_subscription_event(&event)
                .await;
        }
        "checkout.session.completed" => {
            let session = &event["data"]["object"];
            if let Some(session_id) = session["id"].as_str() {
                app_state
                    .checkout_use_cases
                    .record_checkout_completed(session_id)
                    .await;
            } else {
                tracing::debug!(event_id, "checkout.session.completed without a session id");
            }
        }
        "checkout.session.expired" => {
            // Checkout was abandoned; the pending record stays pending.
            let session_id = event["data"]["object"]["id"].as_str().unwrap_or("unknown");
            tracing::debug!(session_id, "Checkout session expired");
        }
        _ => {
            tracing::debug!(event_type, event_id, "Unhandled webhook event type");
        }
    }

    Ok(StatusCode::OK)
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(handle_webhook))
}

// ============================================================================
// Tests
// ============================================================================
