use sqlx::PgPool;

pub mod payment_audit;
pub mod payment_record;
pub mod subscription_record;

#[derive(Clone)]
pub struct PostgresPersistence {
    pub pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
