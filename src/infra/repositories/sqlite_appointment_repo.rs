use crate::domain::{
    models::{
        availability::{Availability, SlotKey},
        appointment::{Appointment, AppointmentSearch, BookingOutcome, BookingRequest, CancellationOutcome},
        waitlist::WaitlistEntry,
    },
    ports::AppointmentRepository,
    services::reconciliation::{plan_booking, plan_cancellation, BookingPlan, CancellationPlan, SlotSnapshot},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteAppointmentRepo {
    pool: SqlitePool,
}

impl SqliteAppointmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Takes the database write lock before anything is read, so every check in
/// the transaction sees the state the writes will commit against.
async fn lock_slot(conn: &mut SqliteConnection, key: &SlotKey) -> Result<(), AppError> {
    sqlx::query("UPDATE availabilities SET is_available = is_available WHERE doctor_id = ? AND date = ? AND time_slot_id = ?")
        .bind(&key.doctor_id).bind(key.date).bind(&key.time_slot_id)
        .execute(&mut *conn).await.map_err(AppError::Database)?;
    Ok(())
}

async fn insert_appointment(conn: &mut SqliteConnection, appointment: &Appointment) -> Result<Appointment, AppError> {
    sqlx::query_as::<_, Appointment>(
        "INSERT INTO appointments (id, patient_id, doctor_id, date, time_slot_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING *"
    )
        .bind(&appointment.id).bind(&appointment.patient_id).bind(&appointment.doctor_id)
        .bind(appointment.date).bind(&appointment.time_slot_id).bind(appointment.created_at)
        .fetch_one(&mut *conn).await.map_err(AppError::Database)
}

async fn set_available(conn: &mut SqliteConnection, availability_id: &str, is_available: bool) -> Result<(), AppError> {
    sqlx::query("UPDATE availabilities SET is_available = ? WHERE id = ?")
        .bind(is_available).bind(availability_id)
        .execute(&mut *conn).await.map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepo {
    async fn book(&self, request: &BookingRequest) -> Result<BookingOutcome, AppError> {
        let key = &request.slot;
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_slot(&mut tx, key).await?;

        let patient_busy = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE patient_id = ? AND date = ? AND time_slot_id = ?")
            .bind(&request.patient_id).bind(key.date).bind(&key.time_slot_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .is_some();

        let doctor_busy = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE doctor_id = ? AND date = ? AND time_slot_id = ?")
            .bind(&key.doctor_id).bind(key.date).bind(&key.time_slot_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .is_some();

        let queued = sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist WHERE patient_id = ? AND doctor_id = ? AND date = ? AND time_slot_id = ?")
            .bind(&request.patient_id).bind(&key.doctor_id).bind(key.date).bind(&key.time_slot_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let open_availability = sqlx::query_as::<_, Availability>("SELECT * FROM availabilities WHERE doctor_id = ? AND date = ? AND time_slot_id = ? AND is_available = TRUE")
            .bind(&key.doctor_id).bind(key.date).bind(&key.time_slot_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let plan = plan_booking(SlotSnapshot { patient_busy, doctor_busy, queued, open_availability })?;

        let outcome = match plan {
            BookingPlan::Confirm { availability_id } => {
                let created = insert_appointment(&mut tx, &Appointment::new(request.patient_id.clone(), key)).await?;
                set_available(&mut tx, &availability_id, false).await?;
                BookingOutcome::Confirmed(created)
            }
            BookingPlan::Enqueue => {
                let entry = WaitlistEntry::new(request.patient_id.clone(), key);
                let created = sqlx::query_as::<_, WaitlistEntry>(
                    "INSERT INTO waitlist (id, patient_id, doctor_id, date, time_slot_id, added_at)
                     VALUES (?, ?, ?, ?, ?, ?)
                     RETURNING *"
                )
                    .bind(&entry.id).bind(&entry.patient_id).bind(&entry.doctor_id)
                    .bind(entry.date).bind(&entry.time_slot_id).bind(entry.added_at)
                    .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
                BookingOutcome::Queued(created)
            }
            BookingPlan::AlreadyQueued(entry) => BookingOutcome::AlreadyQueued(entry),
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(outcome)
    }

    async fn cancel(&self, appointment: &Appointment) -> Result<CancellationOutcome, AppError> {
        let key = appointment.key();
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_slot(&mut tx, &key).await?;

        let availability = sqlx::query_as::<_, Availability>("SELECT * FROM availabilities WHERE doctor_id = ? AND date = ? AND time_slot_id = ?")
            .bind(&key.doctor_id).bind(key.date).bind(&key.time_slot_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let deleted = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(&appointment.id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Appointment not found".into()));
        }

        let next_in_line = sqlx::query_as::<_, WaitlistEntry>(
            "SELECT w.* FROM waitlist w
             WHERE w.doctor_id = ? AND w.date = ? AND w.time_slot_id = ?
               AND NOT EXISTS (
                   SELECT 1 FROM appointments a
                   WHERE a.patient_id = w.patient_id AND a.date = w.date AND a.time_slot_id = w.time_slot_id
               )
             ORDER BY w.added_at ASC, w.id ASC
             LIMIT 1"
        )
            .bind(&key.doctor_id).bind(key.date).bind(&key.time_slot_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let outcome = match plan_cancellation(&key, availability, next_in_line)? {
            CancellationPlan::Promote { availability_id, entry } => {
                let promoted = insert_appointment(&mut tx, &Appointment::new(entry.patient_id.clone(), &key)).await?;
                sqlx::query("DELETE FROM waitlist WHERE id = ?")
                    .bind(&entry.id)
                    .execute(&mut *tx).await.map_err(AppError::Database)?;
                set_available(&mut tx, &availability_id, false).await?;
                CancellationOutcome::Promoted(promoted)
            }
            CancellationPlan::Release { availability_id } => {
                set_available(&mut tx, &availability_id, true).await?;
                CancellationOutcome::Released
            }
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(outcome)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_participant(&self, patient_id: Option<&str>, doctor_id: Option<&str>) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT a.* FROM appointments a
             JOIN time_slots t ON t.id = a.time_slot_id
             WHERE a.patient_id = ? OR a.doctor_id = ?
             ORDER BY a.date ASC, t.start_time ASC"
        )
            .bind(patient_id).bind(doctor_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn search(&self, search: &AppointmentSearch) -> Result<Vec<Appointment>, AppError> {
        let doctor_pattern = search.doctor_pattern();
        let patient_pattern = search.patient_pattern();

        sqlx::query_as::<_, Appointment>(
            r"SELECT a.* FROM appointments a
              JOIN time_slots t ON t.id = a.time_slot_id
              JOIN doctors d ON d.id = a.doctor_id
              JOIN users du ON du.id = d.user_id
              JOIN patients p ON p.id = a.patient_id
              JOIN users pu ON pu.id = p.user_id
              WHERE (? IS NULL OR du.username_folded LIKE ? ESCAPE '\')
                AND (? IS NULL OR pu.username_folded LIKE ? ESCAPE '\')
              ORDER BY a.date ASC, t.start_time ASC
              LIMIT ?"
        )
            .bind(&doctor_pattern).bind(&doctor_pattern)
            .bind(&patient_pattern).bind(&patient_pattern)
            .bind(search.limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
