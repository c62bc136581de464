use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription_sync::{SubscriptionRecordRepo, SubscriptionUpsert},
    domain::entities::subscription::SubscriptionRecord,
};

fn row_to_record(row: sqlx::postgres::PgRow) -> SubscriptionRecord {
    SubscriptionRecord {
        id: row.get("id"),
        stripe_subscription_id: row.get("stripe_subscription_id"),
        stripe_customer_id: row.get("stripe_customer_id"),
        status: row.get("status"),
        current_period_start: row.get("current_period_start"),
        current_period_end: row.get("current_period_end"),
        cancel_at_period_end: row.get("cancel_at_period_end"),
        canceled_at: row.get("canceled_at"),
        default_payment_method: row.get("default_payment_method"),
        price_id: row.get("price_id"),
        quantity: row.get("quantity"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, stripe_subscription_id, stripe_customer_id, status,
    current_period_start, current_period_end, cancel_at_period_end, canceled_at,
    default_payment_method, price_id, quantity, metadata, created_at, updated_at
"#;

#[async_trait]
impl SubscriptionRecordRepo for PostgresPersistence {
    async fn get_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> AppResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscription_records WHERE stripe_subscription_id = $1",
            SELECT_COLS
        ))
        .bind(stripe_subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_record))
    }

    async fn upsert(&self, input: &SubscriptionUpsert) -> AppResult<SubscriptionRecord> {
        // Full overwrite on conflict (last write wins); created_at is kept.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO subscription_records
                (id, stripe_subscription_id, stripe_customer_id, status,
                 current_period_start, current_period_end, cancel_at_period_end, canceled_at,
                 default_payment_method, price_id, quantity, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (stripe_subscription_id) DO UPDATE SET
                stripe_customer_id = EXCLUDED.stripe_customer_id,
                status = EXCLUDED.status,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                cancel_at_period_end = EXCLUDED.cancel_at_period_end,
                canceled_at = EXCLUDED.canceled_at,
                default_payment_method = EXCLUDED.default_payment_method,
                price_id = EXCLUDED.price_id,
                quantity = EXCLUDED.quantity,
                metadata = EXCLUDED.metadata,
                updated_at = now()
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.stripe_subscription_id)
        .bind(&input.stripe_customer_id)
        .bind(input.status)
        .bind(input.current_period_start)
        .bind(input.current_period_end)
        .bind(input.cancel_at_period_end)
        .bind(input.canceled_at)
        .bind(&input.default_payment_method)
        .bind(&input.price_id)
        .bind(input.quantity)
        .bind(&input.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_record(row))
    }
}
