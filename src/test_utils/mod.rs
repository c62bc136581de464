//! Shared test doubles: in-memory repositories, a scriptable provider
//! port, and an app-state builder for route tests.

pub mod app_state_builder;
pub mod billing_mocks;

pub use app_state_builder::{TEST_WEBHOOK_SECRET, TestAppStateBuilder, test_plan_catalog};
pub use billing_mocks::{
    InMemoryPaymentAuditRepo, InMemoryPaymentRecordRepo, InMemorySubscriptionRecordRepo,
    MockCheckoutSessionPort, ScriptedLookup,
};
