use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header, request::Parts},
};
use crate::state::AppState;
use crate::config::Config;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::Identity;
use crate::error::AppError;
use std::sync::Arc;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::{debug, Span};

/// The verified caller, provisioned into the local identity directory.
pub struct AuthUser(pub Identity);

pub fn decode_claims(token: &str, config: &Config) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.jwt_audience.as_str()]);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Rejected access token: {}", e);
            AppError::Unauthorized
        })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let access_token = parts.headers.get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?
            .trim()
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let claims = decode_claims(&access_token, &app_state.config)?;
        let identity = app_state.identity_repo.provision(&claims.sub, claims.role()).await?;

        Span::current().record("username", identity.username.as_str());

        Ok(AuthUser(identity))
    }
}
