use std::collections::HashMap;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

use crate::{
    application::billing_view_model::{PromoCodeTable, PromoKind},
    domain::entities::billing_plan::BillingPlan,
};

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub cors_origin: HeaderValue,
    /// Stripe secret key. Absence means checkout confirmation is disabled
    /// and surfaces to callers as a configuration error.
    pub stripe_secret_key: Option<SecretString>,
    /// Stripe webhook signing secret. Absence disables webhook intake.
    pub stripe_webhook_secret: Option<SecretString>,
    /// Plan catalog, a JSON array in PLAN_CATALOG. The catalog is
    /// configuration, not data this service owns.
    pub plan_catalog: Vec<BillingPlan>,
    /// Price per mentorship hour for a la carte purchases.
    pub unit_price: f64,
    /// Floor for a la carte purchases; overrides below it are clamped up.
    pub minimum_a_la_carte_hours: f64,
    pub tax_rate: f64,
    /// Promo codes as a JSON object in PROMO_CODES, e.g.
    /// `{"NP12345":"full_discount","MENTO12345":"penny_remainder"}`.
    /// Defaults to the production codes when unset.
    pub promo_codes: PromoCodeTable,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let stripe_secret_key = read_secret("STRIPE_SECRET_KEY");
        let stripe_webhook_secret = read_secret("STRIPE_WEBHOOK_SECRET");

        let plan_catalog: Vec<BillingPlan> = match std::env::var("PLAN_CATALOG") {
            Ok(raw) => {
                serde_json::from_str(&raw).expect("PLAN_CATALOG must be a JSON array of plans")
            }
            Err(_) => Vec::new(),
        };

        let unit_price: f64 = get_env_default("UNIT_PRICE", 14.95);
        let minimum_a_la_carte_hours: f64 = get_env_default("MINIMUM_A_LA_CARTE_HOURS", 30.0);
        let tax_rate: f64 = get_env_default("TAX_RATE", 0.0);

        let promo_codes = match std::env::var("PROMO_CODES") {
            Ok(raw) => {
                let codes: HashMap<String, PromoKind> = serde_json::from_str(&raw)
                    .expect("PROMO_CODES must be a JSON object of code -> kind");
                PromoCodeTable::new(codes)
            }
            Err(_) => PromoCodeTable::default(),
        };

        Self {
            bind_addr,
            database_url,
            cors_origin,
            stripe_secret_key,
            stripe_webhook_secret,
            plan_catalog,
            unit_price,
            minimum_a_la_carte_hours,
            tax_rate,
            promo_codes,
        }
    }
}

fn read_secret(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| SecretString::new(s.into()))
}
