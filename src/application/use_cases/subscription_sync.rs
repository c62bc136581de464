//! Subscription webhook normalization.
//!
//! Deliveries are best-effort and audit-first: the record upsert and the
//! audit append are isolated failure boundaries, and neither failure ever
//! surfaces to the webhook handler. Stripe's redelivery loop is the
//! recovery mechanism for a dropped write.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    app_error::AppResult,
    domain::entities::{
        payment::PaymentAuditEntry,
        subscription::{SubscriptionRecord, SubscriptionStatus},
    },
};

// ============================================================================
// Input Types
// ============================================================================

/// Normalized subscription state extracted from a webhook payload.
/// An upsert fully overwrites the stored row (no field-level merge).
#[derive(Debug, Clone)]
pub struct SubscriptionUpsert {
    pub stripe_subscription_id: String,
    pub stripe_customer_id: String,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<DateTime<Utc>>,
    pub default_payment_method: Option<String>,
    pub price_id: Option<String>,
    pub quantity: Option<i64>,
    pub metadata: Value,
}

#[derive(Debug, Clone)]
pub struct AppendAuditInput {
    pub action: String,
    pub stripe_object: String,
    pub stripe_id: String,
    pub details: Value,
}

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait SubscriptionRecordRepo: Send + Sync {
    async fn get_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> AppResult<Option<SubscriptionRecord>>;

    /// Insert or fully overwrite by provider subscription id; `created_at`
    /// is preserved for existing rows, `updated_at` is stamped to now.
    async fn upsert(&self, input: &SubscriptionUpsert) -> AppResult<SubscriptionRecord>;
}

#[async_trait]
pub trait PaymentAuditRepo: Send + Sync {
    /// Append-only; entries are never updated or deleted.
    async fn append(&self, input: &AppendAuditInput) -> AppResult<()>;

    async fn list_by_stripe_id(&self, stripe_id: &str) -> AppResult<Vec<PaymentAuditEntry>>;
}

// ============================================================================
// Use Cases
// ============================================================================

/// Convert a Unix timestamp in seconds to a UTC datetime.
/// Absent payload fields map to `None`, never to the epoch.
fn timestamp_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

#[derive(Clone)]
pub struct SubscriptionSyncUseCases {
    subscription_repo: Arc<dyn SubscriptionRecordRepo>,
    audit_repo: Arc<dyn PaymentAuditRepo>,
}

impl SubscriptionSyncUseCases {
    pub fn new(
        subscription_repo: Arc<dyn SubscriptionRecordRepo>,
        audit_repo: Arc<dyn PaymentAuditRepo>,
    ) -> Self {
        Self {
            subscription_repo,
            audit_repo,
        }
    }

    /// Applies a `customer.subscription.*` event: upsert the mirror row,
    /// then append an audit entry. Each write is attempted regardless of
    /// the other's outcome, and failures only get logged.
    pub async fn handle_subscription_event(&self, event: &Value) {
        let event_type = event["type"].as_str().unwrap_or("unknown");
        let subscription = &event["data"]["object"];

        let Some(sub_id) = subscription["id"].as_str() else {
            tracing::warn!(event_type, "Subscription event without an object id, skipping");
            return;
        };

        let upsert = Self::normalize(sub_id, subscription);

        if let Err(e) = self.subscription_repo.upsert(&upsert).await {
            tracing::warn!(
                error = %e,
                stripe_subscription_id = sub_id,
                event_type,
                "Failed to upsert subscription from webhook"
            );
        }

        let audit = AppendAuditInput {
            action: format!("webhook_{event_type}"),
            stripe_object: "subscription".to_string(),
            stripe_id: sub_id.to_string(),
            details: serde_json::json!({ "status": upsert.status.as_str() }),
        };
        if let Err(e) = self.audit_repo.append(&audit).await {
            tracing::warn!(
                error = %e,
                stripe_subscription_id = sub_id,
                event_type,
                "Failed to append payment audit entry"
            );
        }
    }

    fn normalize(sub_id: &str, subscription: &Value) -> SubscriptionUpsert {
        let first_item = subscription["items"]["data"]
            .as_array()
            .and_then(|items| items.first());

        let metadata = match subscription.get("metadata") {
            Some(m @ Value::Object(_)) => m.clone(),
            _ => serde_json::json!({}),
        };

        SubscriptionUpsert {
            stripe_subscription_id: sub_id.to_string(),
            stripe_customer_id: subscription["customer"].as_str().unwrap_or("").to_string(),
            status: SubscriptionStatus::from_stripe(
                subscription["status"].as_str().unwrap_or(""),
            ),
            current_period_start: subscription["current_period_start"]
                .as_i64()
                .and_then(timestamp_to_utc),
            current_period_end: subscription["current_period_end"]
                .as_i64()
                .and_then(timestamp_to_utc),
            cancel_at_period_end: subscription["cancel_at_period_end"]
                .as_bool()
                .unwrap_or(false),
            canceled_at: subscription["canceled_at"].as_i64().and_then(timestamp_to_utc),
            default_payment_method: subscription["default_payment_method"]
                .as_str()
                .map(str::to_string),
            price_id: first_item
                .and_then(|item| item["price"]["id"].as_str())
                .map(str::to_string),
            quantity: first_item.and_then(|item| item["quantity"].as_i64()),
            metadata,
        }
    }
}
