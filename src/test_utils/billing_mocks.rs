//! In-memory mock implementations for the billing repository traits and
//! the checkout-session provider port.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::{
        checkout::{
            CheckoutSessionPort, CheckoutSessionView, PaymentRecordRepo, SessionLookup,
        },
        subscription_sync::{
            AppendAuditInput, PaymentAuditRepo, SubscriptionRecordRepo, SubscriptionUpsert,
        },
    },
    domain::entities::{
        payment::{PaymentAuditEntry, PaymentRecord, PaymentStatus},
        subscription::SubscriptionRecord,
    },
};

// ============================================================================
// MockCheckoutSessionPort
// ============================================================================

/// What the mocked provider should answer with.
#[derive(Debug, Clone, Copy)]
pub enum ScriptedLookup {
    /// `Err(..)` as if the request never reached the provider.
    TransportFailure,
    /// Reachable provider, non-success HTTP status.
    Unavailable(u16),
    /// Session with `payment_status == "paid"`.
    Paid,
    /// Session with `status == "complete"` but not yet marked paid.
    Complete,
    /// Session that exists but has not been paid.
    Unpaid,
}

pub struct MockCheckoutSessionPort {
    script: ScriptedLookup,
    calls: AtomicUsize,
}

impl MockCheckoutSessionPort {
    pub fn new(script: ScriptedLookup) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckoutSessionPort for MockCheckoutSessionPort {
    async fn fetch_session(&self, session_id: &str) -> AppResult<SessionLookup> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            ScriptedLookup::TransportFailure => {
                Err(AppError::Internal("simulated transport failure".into()))
            }
            ScriptedLookup::Unavailable(status) => Ok(SessionLookup::Unavailable { status }),
            ScriptedLookup::Paid => Ok(SessionLookup::Session(CheckoutSessionView {
                id: session_id.to_string(),
                payment_status: Some("paid".to_string()),
                status: Some("open".to_string()),
            })),
            ScriptedLookup::Complete => Ok(SessionLookup::Session(CheckoutSessionView {
                id: session_id.to_string(),
                payment_status: Some("unpaid".to_string()),
                status: Some("complete".to_string()),
            })),
            ScriptedLookup::Unpaid => Ok(SessionLookup::Session(CheckoutSessionView {
                id: session_id.to_string(),
                payment_status: Some("unpaid".to_string()),
                status: Some("open".to_string()),
            })),
        }
    }
}

// ============================================================================
// InMemoryPaymentRecordRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPaymentRecordRepo {
    pub records: Mutex<HashMap<String, PaymentRecord>>,
    mark_succeeded_calls: AtomicUsize,
    fail_next: Mutex<Option<AppError>>,
}

impl InMemoryPaymentRecordRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total `mark_succeeded` invocations, including failed ones.
    pub fn mark_succeeded_calls(&self) -> usize {
        self.mark_succeeded_calls.load(Ordering::SeqCst)
    }

    /// Make the next `mark_succeeded` call fail with a database error.
    pub fn fail_next_mark_succeeded(&self) {
        *self.fail_next.lock().unwrap() = Some(AppError::Database("injected failure".into()));
    }
}

#[async_trait]
impl PaymentRecordRepo for InMemoryPaymentRecordRepo {
    async fn get_by_session_id(
        &self,
        stripe_session_id: &str,
    ) -> AppResult<Option<PaymentRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(stripe_session_id)
            .cloned())
    }

    async fn mark_succeeded(
        &self,
        stripe_session_id: &str,
        paid_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.mark_succeeded_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }

        let mut records = self.records.lock().unwrap();
        let now = Utc::now();
        match records.get_mut(stripe_session_id) {
            Some(record) => {
                record.status = PaymentStatus::Succeeded;
                // First paid_at sticks, matching the SQL upsert.
                record.paid_at = record.paid_at.or(Some(paid_at));
                record.updated_at = Some(now);
            }
            None => {
                records.insert(
                    stripe_session_id.to_string(),
                    PaymentRecord {
                        id: Uuid::new_v4(),
                        stripe_session_id: stripe_session_id.to_string(),
                        status: PaymentStatus::Succeeded,
                        paid_at: Some(paid_at),
                        created_at: Some(now),
                        updated_at: Some(now),
                    },
                );
            }
        }
        Ok(())
    }
}

// ============================================================================
// InMemorySubscriptionRecordRepo
// ============================================================================

#[derive(Default)]
pub struct InMemorySubscriptionRecordRepo {
    pub rows: Mutex<HashMap<String, SubscriptionRecord>>,
    fail_next: Mutex<Option<AppError>>,
}

impl InMemorySubscriptionRecordRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fail_next_upsert(&self, err: AppError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl SubscriptionRecordRepo for InMemorySubscriptionRecordRepo {
    async fn get_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> AppResult<Option<SubscriptionRecord>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(stripe_subscription_id)
            .cloned())
    }

    async fn upsert(&self, input: &SubscriptionUpsert) -> AppResult<SubscriptionRecord> {
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }

        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let existing = rows.get(&input.stripe_subscription_id);

        let record = SubscriptionRecord {
            id: existing.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
            stripe_subscription_id: input.stripe_subscription_id.clone(),
            stripe_customer_id: input.stripe_customer_id.clone(),
            status: input.status,
            current_period_start: input.current_period_start,
            current_period_end: input.current_period_end,
            cancel_at_period_end: input.cancel_at_period_end,
            canceled_at: input.canceled_at,
            default_payment_method: input.default_payment_method.clone(),
            price_id: input.price_id.clone(),
            quantity: input.quantity,
            metadata: input.metadata.clone(),
            created_at: existing.and_then(|r| r.created_at).or(Some(now)),
            updated_at: Some(now),
        };

        rows.insert(input.stripe_subscription_id.clone(), record.clone());
        Ok(record)
    }
}

// ============================================================================
// InMemoryPaymentAuditRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPaymentAuditRepo {
    pub entries: Mutex<Vec<PaymentAuditEntry>>,
    fail_next: Mutex<Option<AppError>>,
}

impl InMemoryPaymentAuditRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fail_next_append(&self, err: AppError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl PaymentAuditRepo for InMemoryPaymentAuditRepo {
    async fn append(&self, input: &AppendAuditInput) -> AppResult<()> {
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }

        self.entries.lock().unwrap().push(PaymentAuditEntry {
            id: Uuid::new_v4(),
            action: input.action.clone(),
            stripe_object: input.stripe_object.clone(),
            stripe_id: input.stripe_id.clone(),
            details: input.details.clone(),
            at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn list_by_stripe_id(&self, stripe_id: &str) -> AppResult<Vec<PaymentAuditEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.stripe_id == stripe_id)
            .cloned()
            .collect())
    }
}
