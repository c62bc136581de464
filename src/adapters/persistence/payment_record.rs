use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::checkout::PaymentRecordRepo,
    domain::entities::payment::{PaymentRecord, PaymentStatus},
};

fn row_to_record(row: sqlx::postgres::PgRow) -> PaymentRecord {
    PaymentRecord {
        id: row.get("id"),
        stripe_session_id: row.get("stripe_session_id"),
        status: row.get("status"),
        paid_at: row.get("paid_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = "id, stripe_session_id, status, paid_at, created_at, updated_at";

#[async_trait]
impl PaymentRecordRepo for PostgresPersistence {
    async fn get_by_session_id(
        &self,
        stripe_session_id: &str,
    ) -> AppResult<Option<PaymentRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM billing_payments WHERE stripe_session_id = $1",
            SELECT_COLS
        ))
        .bind(stripe_session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_record))
    }

    async fn mark_succeeded(
        &self,
        stripe_session_id: &str,
        paid_at: DateTime<Utc>,
    ) -> AppResult<()> {
        // Upsert keyed by session id: safe to call for sessions the
        // checkout flow never registered (webhook-first delivery), and
        // the first paid_at sticks across duplicate confirmations.
        sqlx::query(
            r#"
            INSERT INTO billing_payments (id, stripe_session_id, status, paid_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (stripe_session_id) DO UPDATE
                SET status = EXCLUDED.status,
                    paid_at = COALESCE(billing_payments.paid_at, EXCLUDED.paid_at),
                    updated_at = now()
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(stripe_session_id)
        .bind(PaymentStatus::Succeeded)
        .bind(paid_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }
}
