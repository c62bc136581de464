use serde::{Deserialize, Serialize};

/// How a plan is priced: a fixed bundle of hours, or per-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Block,
    ALaCarte,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Block => "block",
            PlanKind::ALaCarte => "a_la_carte",
        }
    }
}

/// Immutable catalog entry. Supplied via configuration, never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingPlan {
    pub id: String,
    pub kind: PlanKind,
    pub title: String,
    pub description: Option<String>,
    /// Hours granted by a block purchase. Ignored for a la carte plans.
    pub hours: f64,
    /// Display price for a block purchase. Ignored for a la carte plans.
    pub price: f64,
    /// Provider-specific price ID (e.g., Stripe price ID)
    pub stripe_price_id: Option<String>,
}
