pub mod billing_plan;
pub mod hour_wallet;
pub mod payment;
pub mod subscription;
