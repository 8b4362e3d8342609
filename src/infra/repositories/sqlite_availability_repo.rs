use crate::domain::{
    models::availability::{Availability, AvailabilityFilter, SlotKey},
    ports::AvailabilityRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteAvailabilityRepo {
    pool: SqlitePool,
}

impl SqliteAvailabilityRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn clear_waitlist(conn: &mut SqliteConnection, key: &SlotKey) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM waitlist WHERE doctor_id = ? AND date = ? AND time_slot_id = ?")
        .bind(&key.doctor_id).bind(key.date).bind(&key.time_slot_id)
        .execute(&mut *conn).await.map_err(AppError::Database)?;
    Ok(result.rows_affected())
}

const DUPLICATE_KEY: &str = "Availability already exists for this doctor and time slot";

#[async_trait]
impl AvailabilityRepository for SqliteAvailabilityRepo {
    async fn create(&self, availability: &Availability) -> Result<Availability, AppError> {
        // the (doctor, date, slot) unique key settles concurrent publishes
        sqlx::query_as::<_, Availability>(
            "INSERT INTO availabilities (id, doctor_id, date, time_slot_id, is_available, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&availability.id).bind(&availability.doctor_id).bind(availability.date)
            .bind(&availability.time_slot_id).bind(availability.is_available).bind(availability.created_at)
            .fetch_one(&self.pool).await
            .map_err(AppError::conflict_on_duplicate(DUPLICATE_KEY))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Availability>, AppError> {
        sqlx::query_as::<_, Availability>("SELECT * FROM availabilities WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_open(&self, filter: &AvailabilityFilter) -> Result<Vec<Availability>, AppError> {
        sqlx::query_as::<_, Availability>(
            "SELECT a.* FROM availabilities a
             JOIN time_slots t ON t.id = a.time_slot_id
             WHERE a.is_available = TRUE
               AND (? IS NULL OR a.doctor_id = ?)
               AND (? IS NULL OR a.date = ?)
             ORDER BY a.date ASC, t.start_time ASC"
        )
            .bind(&filter.doctor_id).bind(&filter.doctor_id)
            .bind(filter.date).bind(filter.date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, availability: &Availability) -> Result<Availability, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        // write first so the transaction holds the write lock before it reads
        sqlx::query("UPDATE availabilities SET id = id WHERE id = ?")
            .bind(&availability.id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let previous = sqlx::query_as::<_, Availability>("SELECT * FROM availabilities WHERE id = ?")
            .bind(&availability.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Availability not found".into()))?;

        let updated = sqlx::query_as::<_, Availability>(
            "UPDATE availabilities SET date = ?, time_slot_id = ?
             WHERE id = ? AND is_available = TRUE
             RETURNING *"
        )
            .bind(availability.date).bind(&availability.time_slot_id).bind(&availability.id)
            .fetch_optional(&mut *tx).await
            .map_err(AppError::conflict_on_duplicate(DUPLICATE_KEY))?
            .ok_or(AppError::Conflict("Availability is booked and cannot be changed".into()))?;

        if previous.key() != updated.key() {
            clear_waitlist(&mut tx, &previous.key()).await?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn delete(&self, availability: &Availability) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let result = sqlx::query("DELETE FROM availabilities WHERE id = ? AND is_available = TRUE")
            .bind(&availability.id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Availability is booked; cancel the appointment first".into()));
        }
        clear_waitlist(&mut tx, &availability.key()).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
