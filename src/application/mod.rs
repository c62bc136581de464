pub mod app_error;
pub mod billing_view_model;
pub mod idempotency;
pub mod use_cases;
