pub mod checkout;
pub mod subscription_sync;
