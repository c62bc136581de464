use std::sync::Arc;

use crate::{
    application::use_cases::{
        checkout::CheckoutUseCases, subscription_sync::SubscriptionSyncUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub checkout_use_cases: Arc<CheckoutUseCases>,
    pub subscription_sync_use_cases: Arc<SubscriptionSyncUseCases>,
}
