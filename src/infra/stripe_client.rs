use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::checkout::{CheckoutSessionPort, CheckoutSessionView, SessionLookup},
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Signature timestamps older than this are rejected.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: Client::new(),
            secret_key,
        }
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{}:", self.secret_key));
        format!("Basic {}", encoded)
    }
}

#[async_trait]
impl CheckoutSessionPort for StripeClient {
    async fn fetch_session(&self, session_id: &str) -> AppResult<SessionLookup> {
        let response = self
            .client
            .get(format!(
                "{}/checkout/sessions/{}",
                STRIPE_API_BASE, session_id
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Stripe request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Stripe session lookup returned an error");
            return Ok(SessionLookup::Unavailable {
                status: status.as_u16(),
            });
        }

        let session: StripeCheckoutSession = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Stripe response: {}", e)))?;

        Ok(SessionLookup::Session(CheckoutSessionView {
            id: session.id,
            payment_status: session.payment_status,
            status: session.status,
        }))
    }
}

// ============================================================================
// Webhook Signature Verification
// ============================================================================

/// Verifies a `stripe-signature` header against the request body.
///
/// The header carries `t=<timestamp>,v1=<hex hmac>,...`; the signed string
/// is `"{t}.{body}"` under HMAC-SHA256 with the webhook secret.
pub fn verify_webhook_signature(
    payload: &str,
    signature_header: &str,
    webhook_secret: &str,
) -> AppResult<()> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = Some(value),
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| AppError::InvalidInput("Missing timestamp in signature".into()))?;

    if signatures.is_empty() {
        return Err(AppError::InvalidInput("Missing signature".into()));
    }

    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac = Hmac::<Sha256>::new_from_slice(webhook_secret.as_bytes())
        .map_err(|_| AppError::Internal("HMAC error".into()))?;
    mac.update(signed_payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    for sig in signatures {
        if constant_time_compare(sig, &expected) {
            let ts: i64 = timestamp
                .parse()
                .map_err(|_| AppError::InvalidInput("Invalid timestamp".into()))?;
            let now = chrono::Utc::now().timestamp();
            if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
                return Err(AppError::InvalidInput("Timestamp too old".into()));
            }
            return Ok(());
        }
    }

    Err(AppError::InvalidInput("Invalid signature".into()))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

// ============================================================================
// Stripe Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    payment_status: Option<String>,
    status: Option<String>,
}
