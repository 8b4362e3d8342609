use crate::domain::{
    models::user::{fold_username, DoctorSummary, Identity, IdentityRow, Profile, Role, User},
    ports::IdentityRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info};

const IDENTITY_SELECT: &str = "SELECT u.id AS user_id, u.username, u.role, d.id AS doctor_id, p.id AS patient_id
     FROM users u
     LEFT JOIN doctors d ON d.user_id = u.id
     LEFT JOIN patients p ON p.user_id = u.id
     WHERE u.username = ?";

pub struct SqliteIdentityRepo {
    pool: SqlitePool,
}

impl SqliteIdentityRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn ensure_profile(conn: &mut SqliteConnection, table: &'static str, user_id: &str) -> Result<(), AppError> {
    let profile = Profile::new(user_id.to_string());
    sqlx::query(&format!("INSERT INTO {} (id, user_id, created_at) VALUES (?, ?, ?) ON CONFLICT (user_id) DO NOTHING", table))
        .bind(&profile.id).bind(&profile.user_id).bind(profile.created_at)
        .execute(&mut *conn).await.map_err(AppError::Database)?;
    Ok(())
}

fn into_identity(row: IdentityRow) -> Result<Identity, AppError> {
    Identity::try_from(row).map_err(AppError::Invariant)
}

#[async_trait]
impl IdentityRepository for SqliteIdentityRepo {
    async fn provision(&self, username: &str, role: Role) -> Result<Identity, AppError> {
        if let Some(existing) = self.find_by_username(username).await?
            && existing.role == role
            && (!role.is_doctor() || existing.doctor_id.is_some())
            && (!role.is_patient() || existing.patient_id.is_some()) {
            return Ok(existing);
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let candidate = User::new(username.to_string(), role);
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, username_folded, role, created_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (username) DO UPDATE SET role = excluded.role
             RETURNING *"
        )
            .bind(&candidate.id).bind(&candidate.username).bind(fold_username(&candidate.username)).bind(&candidate.role).bind(candidate.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        if role.is_doctor() { ensure_profile(&mut tx, "doctors", &user.id).await?; }
        if role.is_patient() { ensure_profile(&mut tx, "patients", &user.id).await?; }

        let row = sqlx::query_as::<_, IdentityRow>(IDENTITY_SELECT)
            .bind(username)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;

        info!(username = %username, role = %role, "Identity provisioned");
        into_identity(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        sqlx::query_as::<_, IdentityRow>(IDENTITY_SELECT)
            .bind(username)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .map(into_identity)
            .transpose()
    }

    async fn list_doctors(&self) -> Result<Vec<DoctorSummary>, AppError> {
        sqlx::query_as::<_, DoctorSummary>(
            "SELECT d.id, u.username FROM doctors d JOIN users u ON u.id = d.user_id
             WHERE u.role IN ('DOCTOR', 'DOCTOR_AND_PATIENT')
             ORDER BY u.username ASC"
        )
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, user_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("SQLite user deletion failed: {:?}", e);
                AppError::Database(e)
            })?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("User not found".into())); }
        Ok(())
    }
}
