use serde::{Deserialize, Serialize};

/// A mentee's balance of purchased mentorship hours.
///
/// Invariant: `0 <= total_remaining <= total_allocated`. Only confirmed
/// purchases and consumption events mutate the stored balance; this type is
/// a read snapshot handed to the pricing layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourCreditWallet {
    /// Lifetime hours granted.
    pub total_allocated: f64,
    /// Hours not yet consumed.
    pub total_remaining: f64,
}

impl HourCreditWallet {
    /// Builds a wallet, clamping `total_remaining` into `[0, total_allocated]`.
    pub fn new(total_allocated: f64, total_remaining: f64) -> Self {
        let total_allocated = total_allocated.max(0.0);
        Self {
            total_allocated,
            total_remaining: total_remaining.clamp(0.0, total_allocated),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.total_remaining >= 0.0 && self.total_remaining <= self.total_allocated
    }
}
