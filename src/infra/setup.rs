use std::fs::File;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        checkout::{CheckoutSessionPort, CheckoutUseCases, PaymentRecordRepo},
        subscription_sync::{PaymentAuditRepo, SubscriptionRecordRepo, SubscriptionSyncUseCases},
    },
    infra::{config::AppConfig, postgres_persistence, stripe_client::StripeClient},
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);

    let payment_repo = postgres_arc.clone() as Arc<dyn PaymentRecordRepo>;
    let subscription_repo = postgres_arc.clone() as Arc<dyn SubscriptionRecordRepo>;
    let audit_repo = postgres_arc.clone() as Arc<dyn PaymentAuditRepo>;

    // No Stripe key means no session port; the Confirmer reports the
    // missing credential instead of guessing.
    let session_port = config.stripe_secret_key.as_ref().map(|key| {
        Arc::new(StripeClient::new(key.expose_secret().to_string())) as Arc<dyn CheckoutSessionPort>
    });

    let checkout_use_cases = CheckoutUseCases::new(session_port, payment_repo);
    let subscription_sync_use_cases =
        SubscriptionSyncUseCases::new(subscription_repo, audit_repo);

    Ok(AppState {
        config: Arc::new(config),
        checkout_use_cases: Arc::new(checkout_use_cases),
        subscription_sync_use_cases: Arc::new(subscription_sync_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mentora_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
