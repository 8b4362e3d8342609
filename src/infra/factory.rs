use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::ports::TimeSlotRepository;
use crate::domain::services::{booking::BookingService, time_slots::daily_catalog};
use crate::infra::repositories::{
    postgres_identity_repo::PostgresIdentityRepo, postgres_time_slot_repo::PostgresTimeSlotRepo,
    postgres_availability_repo::PostgresAvailabilityRepo, postgres_appointment_repo::PostgresAppointmentRepo,
    postgres_waitlist_repo::PostgresWaitlistRepo,
    sqlite_identity_repo::SqliteIdentityRepo, sqlite_time_slot_repo::SqliteTimeSlotRepo,
    sqlite_availability_repo::SqliteAvailabilityRepo, sqlite_appointment_repo::SqliteAppointmentRepo,
    sqlite_waitlist_repo::SqliteWaitlistRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_state(config, pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(sqlite_connect_options(database_url))
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_state(config, pool)
    };

    let inserted = seed_time_slots(state.time_slot_repo.as_ref()).await
        .expect("Failed to seed time slot catalog");
    info!(inserted, "Time slot catalog ready");

    state
}

/// WAL journal plus a busy timeout, so writers contending for the same slot
/// wait for each other instead of failing.
pub fn sqlite_connect_options(database_url: &str) -> SqliteConnectOptions {
    SqliteConnectOptions::from_str(database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500))
}

pub fn sqlite_state(config: &Config, pool: SqlitePool) -> AppState {
    let identity_repo = Arc::new(SqliteIdentityRepo::new(pool.clone()));
    let appointment_repo = Arc::new(SqliteAppointmentRepo::new(pool.clone()));
    let booking_service = Arc::new(BookingService::new(appointment_repo.clone(), identity_repo.clone()));

    AppState {
        config: config.clone(),
        identity_repo,
        time_slot_repo: Arc::new(SqliteTimeSlotRepo::new(pool.clone())),
        availability_repo: Arc::new(SqliteAvailabilityRepo::new(pool.clone())),
        appointment_repo,
        waitlist_repo: Arc::new(SqliteWaitlistRepo::new(pool.clone())),
        booking_service,
    }
}

pub fn postgres_state(config: &Config, pool: PgPool) -> AppState {
    let identity_repo = Arc::new(PostgresIdentityRepo::new(pool.clone()));
    let appointment_repo = Arc::new(PostgresAppointmentRepo::new(pool.clone()));
    let booking_service = Arc::new(BookingService::new(appointment_repo.clone(), identity_repo.clone()));

    AppState {
        config: config.clone(),
        identity_repo,
        time_slot_repo: Arc::new(PostgresTimeSlotRepo::new(pool.clone())),
        availability_repo: Arc::new(PostgresAvailabilityRepo::new(pool.clone())),
        appointment_repo,
        waitlist_repo: Arc::new(PostgresWaitlistRepo::new(pool.clone())),
        booking_service,
    }
}

/// Get-or-create of the fixed daily catalog; safe to run on every start.
pub async fn seed_time_slots(repo: &dyn TimeSlotRepository) -> Result<u64, AppError> {
    repo.seed(&daily_catalog()).await
}

pub async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
