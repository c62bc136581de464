use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription_sync::{AppendAuditInput, PaymentAuditRepo},
    domain::entities::payment::PaymentAuditEntry,
};

fn row_to_entry(row: sqlx::postgres::PgRow) -> PaymentAuditEntry {
    PaymentAuditEntry {
        id: row.get("id"),
        action: row.get("action"),
        stripe_object: row.get("stripe_object"),
        stripe_id: row.get("stripe_id"),
        details: row.get("details"),
        at: row.get("at"),
    }
}

const SELECT_COLS: &str = "id, action, stripe_object, stripe_id, details, at";

#[async_trait]
impl PaymentAuditRepo for PostgresPersistence {
    async fn append(&self, input: &AppendAuditInput) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_audit (id, action, stripe_object, stripe_id, details)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.action)
        .bind(&input.stripe_object)
        .bind(&input.stripe_id)
        .bind(&input.details)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn list_by_stripe_id(&self, stripe_id: &str) -> AppResult<Vec<PaymentAuditEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payment_audit WHERE stripe_id = $1 ORDER BY at DESC",
            SELECT_COLS
        ))
        .bind(stripe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_entry).collect())
    }
}
