use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
        }
    }
}

/// The local record for a provider-hosted checkout session.
///
/// Created when a checkout starts and flipped to `succeeded` by the
/// confirmation call or the webhook stream, whichever lands first. The
/// settle mutation is idempotent per session id, so both may fire.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub stripe_session_id: String,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Append-only audit trail entry. Never updated or deleted by this service.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentAuditEntry {
    pub id: Uuid,
    /// Action name, e.g. `webhook_customer.subscription.updated`.
    pub action: String,
    /// Referenced provider object type, e.g. `subscription`.
    pub stripe_object: String,
    /// Referenced provider object id.
    pub stripe_id: String,
    pub details: serde_json::Value,
    pub at: Option<DateTime<Utc>>,
}
