use crate::domain::{models::time_slot::TimeSlot, ports::TimeSlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTimeSlotRepo {
    pool: SqlitePool,
}

impl SqliteTimeSlotRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSlotRepository for SqliteTimeSlotRepo {
    async fn seed(&self, slots: &[TimeSlot]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut inserted = 0;
        for slot in slots {
            let result = sqlx::query("INSERT INTO time_slots (id, start_time, end_time) VALUES (?, ?, ?) ON CONFLICT (start_time, end_time) DO NOTHING")
                .bind(&slot.id).bind(slot.start_time).bind(slot.end_time)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(inserted)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots ORDER BY start_time ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
