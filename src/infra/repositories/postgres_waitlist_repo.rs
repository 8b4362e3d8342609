use crate::domain::{models::waitlist::WaitlistEntry, ports::WaitlistRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresWaitlistRepo {
    pool: PgPool,
}

impl PostgresWaitlistRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WaitlistRepository for PostgresWaitlistRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist WHERE patient_id = $1 ORDER BY date ASC, added_at ASC")
            .bind(patient_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM waitlist WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Waitlist entry not found".into())); }
        Ok(())
    }
}
