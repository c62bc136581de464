//! Pure pricing computations for the checkout surface.
//!
//! The view-model is handed its whole world at construction time - plan
//! catalog, wallet snapshot, unit price, promo table - and never fetches
//! or persists anything. Cart items and totals are recomputed on every
//! call so stale pricing is never served.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        billing_plan::{BillingPlan, PlanKind},
        hour_wallet::HourCreditWallet,
    },
};

// ============================================================================
// Promo codes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoKind {
    /// 100% off, nothing charged.
    FullDiscount,
    /// Everything but one cent discounted, leaving a token charge.
    PennyRemainder,
}

/// Externally supplied promo table. Codes match case-sensitively.
///
/// `Default` carries the two production codes so deployments without a
/// `PROMO_CODES` override keep the historical behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct PromoCodeTable {
    codes: HashMap<String, PromoKind>,
}

impl Default for PromoCodeTable {
    fn default() -> Self {
        let mut codes = HashMap::new();
        codes.insert("NP12345".to_string(), PromoKind::FullDiscount);
        codes.insert("MENTO12345".to_string(), PromoKind::PennyRemainder);
        Self { codes }
    }
}

impl PromoCodeTable {
    pub fn new(codes: HashMap<String, PromoKind>) -> Self {
        Self { codes }
    }

    fn lookup(&self, code: &str) -> Option<PromoKind> {
        self.codes.get(code).copied()
    }
}

// ============================================================================
// Output Types
// ============================================================================

/// Dashboard hour figures. `hours_in_bank` and `hours_remaining` are equal
/// by construction - the duplication is part of the output shape consumers
/// already depend on, keep both.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HourKpis {
    pub hours_in_bank: f64,
    pub hours_used: f64,
    pub hours_remaining: f64,
}

/// Derived line item, recomputed on every call, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub plan_id: String,
    pub kind: PlanKind,
    pub hours: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ============================================================================
// View-Model
// ============================================================================

fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub struct BillingViewModel {
    plans: Vec<BillingPlan>,
    wallet: HourCreditWallet,
    unit_price: f64,
    minimum_hours: f64,
    promo_codes: PromoCodeTable,
}

impl BillingViewModel {
    pub fn new(
        plans: Vec<BillingPlan>,
        wallet: HourCreditWallet,
        unit_price: f64,
        minimum_hours: f64,
        promo_codes: PromoCodeTable,
    ) -> Self {
        Self {
            plans,
            wallet,
            unit_price,
            minimum_hours,
            promo_codes,
        }
    }

    pub fn derive_kpis(&self) -> HourKpis {
        HourKpis {
            hours_in_bank: self.wallet.total_remaining,
            hours_used: self.wallet.total_allocated - self.wallet.total_remaining,
            hours_remaining: self.wallet.total_remaining,
        }
    }

    /// Builds a line item for a plan. Block plans carry their fixed hours
    /// and display price and ignore any override; a la carte plans price
    /// `max(override, minimum)` hours at the unit price.
    pub fn create_cart_item(
        &self,
        plan_id: &str,
        override_hours: Option<f64>,
    ) -> AppResult<CartItem> {
        let plan = self
            .plans
            .iter()
            .find(|p| p.id == plan_id)
            .ok_or(AppError::NotFound)?;

        let item = match plan.kind {
            PlanKind::Block => CartItem {
                plan_id: plan.id.clone(),
                kind: plan.kind,
                hours: plan.hours,
                amount: plan.price,
            },
            PlanKind::ALaCarte => {
                let hours = override_hours
                    .unwrap_or(self.minimum_hours)
                    .max(self.minimum_hours);
                CartItem {
                    plan_id: plan.id.clone(),
                    kind: plan.kind,
                    hours,
                    amount: round_cents(hours * self.unit_price),
                }
            }
        };
        Ok(item)
    }

    /// Computes order totals. A recognized promo code overrides the
    /// discount directly and suppresses tax on the remainder; an
    /// unrecognized code changes nothing but gets called out in the note.
    pub fn compute_totals(
        &self,
        items: &[CartItem],
        tax_rate: f64,
        discount_code: Option<&str>,
    ) -> OrderTotals {
        let subtotal = round_cents(items.iter().map(|i| i.amount).sum());

        let code = discount_code.filter(|c| !c.is_empty());
        let Some(code) = code else {
            return Self::taxed_totals(subtotal, tax_rate, None);
        };

        match self.promo_codes.lookup(code) {
            Some(PromoKind::FullDiscount) => OrderTotals {
                subtotal,
                discount: subtotal,
                tax: 0.0,
                total: 0.0,
                note: Some(format!("Promo code {code} applied: order fully discounted")),
            },
            Some(PromoKind::PennyRemainder) => {
                let discount = round_cents(subtotal - 0.01).max(0.0);
                OrderTotals {
                    subtotal,
                    discount,
                    tax: 0.0,
                    total: round_cents(subtotal - discount),
                    note: Some(format!("Promo code {code} applied")),
                }
            }
            None => Self::taxed_totals(
                subtotal,
                tax_rate,
                Some(format!("Discount code {code} not recognized")),
            ),
        }
    }

    fn taxed_totals(subtotal: f64, tax_rate: f64, note: Option<String>) -> OrderTotals {
        let total = round_cents(subtotal * (1.0 + tax_rate));
        OrderTotals {
            subtotal,
            discount: 0.0,
            tax: round_cents(total - subtotal),
            total,
            note,
        }
    }
}
