use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String, // HS256 secret shared with the identity provider
    pub jwt_audience: String,
    pub search_default_limit: i64,
    pub search_max_limit: i64,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://appointments.db".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set (shared with the identity provider)"),
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "appointment-api".to_string()),
            search_default_limit: env::var("SEARCH_DEFAULT_LIMIT").unwrap_or_else(|_| "50".to_string()).parse().expect("SEARCH_DEFAULT_LIMIT must be a number"),
            search_max_limit: env::var("SEARCH_MAX_LIMIT").unwrap_or_else(|_| "200".to_string()).parse().expect("SEARCH_MAX_LIMIT must be a number"),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
        }
    }

    /// Resolves a client-supplied search limit against the configured bounds.
    pub fn search_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.search_default_limit)
            .clamp(1, self.search_max_limit.max(1))
    }
}
