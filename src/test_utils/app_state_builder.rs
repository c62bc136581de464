//! Builder wiring the in-memory mocks into an `AppState` for route tests.

use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        billing_view_model::PromoCodeTable,
        use_cases::{
            checkout::{CheckoutSessionPort, CheckoutUseCases},
            subscription_sync::SubscriptionSyncUseCases,
        },
    },
    domain::entities::billing_plan::{BillingPlan, PlanKind},
    infra::config::AppConfig,
    test_utils::billing_mocks::{
        InMemoryPaymentAuditRepo, InMemoryPaymentRecordRepo, InMemorySubscriptionRecordRepo,
        MockCheckoutSessionPort, ScriptedLookup,
    },
};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test";

pub fn test_plan_catalog() -> Vec<BillingPlan> {
    vec![
        BillingPlan {
            id: "block_60".to_string(),
            kind: PlanKind::Block,
            title: "60 hour block".to_string(),
            description: Some("Prepaid block of 60 mentorship hours".to_string()),
            hours: 60.0,
            price: 695.0,
            stripe_price_id: Some("price_block_60".to_string()),
        },
        BillingPlan {
            id: "hourly".to_string(),
            kind: PlanKind::ALaCarte,
            title: "Hourly mentorship".to_string(),
            description: None,
            hours: 0.0,
            price: 0.0,
            stripe_price_id: None,
        },
    ]
}

pub struct TestAppStateBuilder {
    payment_repo: Arc<InMemoryPaymentRecordRepo>,
    subscription_repo: Arc<InMemorySubscriptionRecordRepo>,
    audit_repo: Arc<InMemoryPaymentAuditRepo>,
    session_lookup: Option<ScriptedLookup>,
    webhook_secret: bool,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            payment_repo: Arc::new(InMemoryPaymentRecordRepo::new()),
            subscription_repo: Arc::new(InMemorySubscriptionRecordRepo::new()),
            audit_repo: Arc::new(InMemoryPaymentAuditRepo::new()),
            session_lookup: None,
            webhook_secret: true,
        }
    }

    pub fn with_session_lookup(mut self, script: ScriptedLookup) -> Self {
        self.session_lookup = Some(script);
        self
    }

    pub fn without_webhook_secret(mut self) -> Self {
        self.webhook_secret = false;
        self
    }

    pub fn payment_repo(&self) -> Arc<InMemoryPaymentRecordRepo> {
        Arc::clone(&self.payment_repo)
    }

    pub fn subscription_repo(&self) -> Arc<InMemorySubscriptionRecordRepo> {
        Arc::clone(&self.subscription_repo)
    }

    pub fn audit_repo(&self) -> Arc<InMemoryPaymentAuditRepo> {
        Arc::clone(&self.audit_repo)
    }

    pub fn build(self) -> AppState {
        let config = AppConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "postgres://unused".to_string(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            stripe_secret_key: None,
            stripe_webhook_secret: self
                .webhook_secret
                .then(|| SecretString::new(TEST_WEBHOOK_SECRET.into())),
            plan_catalog: test_plan_catalog(),
            unit_price: 14.95,
            minimum_a_la_carte_hours: 30.0,
            tax_rate: 0.0825,
            promo_codes: PromoCodeTable::default(),
        };

        let session_port = self.session_lookup.map(|script| {
            Arc::new(MockCheckoutSessionPort::new(script)) as Arc<dyn CheckoutSessionPort>
        });

        let checkout_use_cases = CheckoutUseCases::new(session_port, self.payment_repo);
        let subscription_sync_use_cases =
            SubscriptionSyncUseCases::new(self.subscription_repo, self.audit_repo);

        AppState {
            config: Arc::new(config),
            checkout_use_cases: Arc::new(checkout_use_cases),
            subscription_sync_use_cases: Arc::new(subscription_sync_use_cases),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
