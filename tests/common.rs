use appointment_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::auth::Claims,
    infra::factory::{run_sqlite_migrations, seed_time_slots, sqlite_connect_options, sqlite_state},
};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::ServiceExt;
use serde_json::{json, Value};

pub const TEST_SECRET: &str = "test-secret-shared-with-idp";
pub const TEST_AUDIENCE: &str = "appointment-api";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(sqlite_connect_options(&db_url))
            .await
            .expect("Failed to connect to test db");

        run_sqlite_migrations(&pool).await;

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: TEST_SECRET.to_string(),
            jwt_audience: TEST_AUDIENCE.to_string(),
            search_default_limit: 50,
            search_max_limit: 200,
            log_dir: "./logs".to_string(),
        };

        let state = Arc::new(sqlite_state(&config, pool.clone()));
        seed_time_slots(state.time_slot_repo.as_ref()).await.expect("Failed to seed time slots");

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Mints a token the way the identity provider would.
    pub fn token(&self, username: &str, is_doctor: bool, is_patient: bool) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            aud: TEST_AUDIENCE.to_string(),
            exp: (now + Duration::hours(1)).timestamp() as usize,
            iat: now.timestamp() as usize,
            is_doctor,
            is_patient,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_bytes()))
            .unwrap()
    }

    pub fn doctor(&self, username: &str) -> String {
        self.token(username, true, false)
    }

    pub fn patient(&self, username: &str) -> String {
        self.token(username, false, true)
    }

    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }

    /// Provisions the caller and returns `/me`.
    pub async fn me(&self, token: &str) -> Value {
        let (status, body) = self.get("/api/v1/me", Some(token)).await;
        assert_eq!(status, StatusCode::OK, "me failed: {}", body);
        body
    }

    pub async fn doctor_id(&self, token: &str) -> String {
        self.me(token).await["doctor_id"].as_str().unwrap().to_string()
    }

    pub async fn patient_id(&self, token: &str) -> String {
        self.me(token).await["patient_id"].as_str().unwrap().to_string()
    }

    /// Id of the n-th catalog slot (0 = 09:00).
    pub async fn slot_id(&self, index: usize) -> String {
        let slots = self.state.time_slot_repo.list().await.unwrap();
        slots[index].id.clone()
    }

    pub async fn publish(&self, doctor_token: &str, date: &str, slot_id: &str) -> Value {
        let (status, body) = self.post(
            "/api/v1/availabilities",
            doctor_token,
            json!({ "date": date, "time_slot_id": slot_id }),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "publish failed: {}", body);
        body
    }

    pub async fn book(&self, patient_token: &str, doctor_id: &str, date: &str, slot_id: &str) -> (StatusCode, Value) {
        self.post(
            "/api/v1/appointments",
            patient_token,
            json!({ "doctor_id": doctor_id, "date": date, "time_slot_id": slot_id }),
        ).await
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn is_available(&self, availability_id: &str) -> bool {
        sqlx::query_scalar::<_, bool>("SELECT is_available FROM availabilities WHERE id = ?")
            .bind(availability_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
