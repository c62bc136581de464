//! Billing routes: plan catalog, checkout confirmation, cart quotes.
//!
//! Handlers stay thin: parse, call the use case or view-model, serialize.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::AppResult,
    adapters::http::app_state::AppState,
    application::{
        billing_view_model::{BillingViewModel, CartItem, HourKpis, OrderTotals},
        idempotency,
        use_cases::checkout::ConfirmOutcome,
    },
    domain::entities::{billing_plan::BillingPlan, hour_wallet::HourCreditWallet},
};

// ============================================================================
// Types
// ============================================================================

#[derive(Deserialize)]
struct ConfirmPayload {
    session_id: String,
}

#[derive(Deserialize)]
struct QuoteItemPayload {
    plan_id: String,
    hours: Option<f64>,
}

#[derive(Deserialize)]
struct QuotePayload {
    items: Vec<QuoteItemPayload>,
    discount_code: Option<String>,
    /// Buyer reference used to seed the idempotency key (e.g. an email).
    reference: Option<String>,
    /// Read snapshot of the buyer's hour balance; KPIs are omitted without it.
    wallet: Option<HourCreditWallet>,
}

#[derive(Serialize)]
struct QuoteResponse {
    items: Vec<CartItem>,
    totals: OrderTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    kpis: Option<HourKpis>,
    /// Tag for the checkout request this quote will turn into; retries
    /// with the same cart and reference reuse the same key.
    idempotency_key: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/billing/plans
async fn list_plans(State(app_state): State<AppState>) -> Json<Vec<BillingPlan>> {
    Json(app_state.config.plan_catalog.clone())
}

/// POST /api/billing/confirm
/// Client-side confirmation after returning from the hosted checkout page.
async fn confirm_session(
    State(app_state): State<AppState>,
    Json(payload): Json<ConfirmPayload>,
) -> AppResult<Json<ConfirmOutcome>> {
    let outcome = app_state
        .checkout_use_cases
        .confirm_session(&payload.session_id)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/billing/quote
/// Prices a cart against the configured catalog. Pure computation.
async fn quote(
    State(app_state): State<AppState>,
    Json(payload): Json<QuotePayload>,
) -> AppResult<Json<QuoteResponse>> {
    let config = &app_state.config;
    let wallet = payload.wallet.unwrap_or(HourCreditWallet::new(0.0, 0.0));

    let view_model = BillingViewModel::new(
        config.plan_catalog.clone(),
        wallet,
        config.unit_price,
        config.minimum_a_la_carte_hours,
        config.promo_codes.clone(),
    );

    let mut items = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        items.push(view_model.create_cart_item(&item.plan_id, item.hours)?);
    }

    let totals = view_model.compute_totals(
        &items,
        config.tax_rate,
        payload.discount_code.as_deref(),
    );

    let mut key_params = std::collections::HashMap::new();
    for item in &items {
        key_params.insert(format!("plan_{}", item.plan_id), item.hours.to_string());
    }
    if let Some(code) = payload.discount_code.as_deref().filter(|c| !c.is_empty()) {
        key_params.insert("code".to_string(), code.to_string());
    }
    let idempotency_key = idempotency::compute(
        "checkout",
        payload.reference.as_deref().unwrap_or("guest"),
        &key_params,
    );

    let kpis = payload.wallet.map(|_| view_model.derive_kpis());

    Ok(Json(QuoteResponse {
        items,
        totals,
        kpis,
        idempotency_key,
    }))
}

// ============================================================================
// Router
// ============================================================================

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/confirm", post(confirm_session))
        .route("/quote", post(quote))
}

// ============================================================================
// Tests
// ============================================================================
