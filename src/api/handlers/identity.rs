use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn me(AuthUser(identity): AuthUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(identity))
}

/// Account removal. Held appointments go through the cancellation path first
/// so their slots are released or handed to the waitlist.
pub async fn remove_me(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.booking_service.remove_account(&identity).await?;
    info!(cancelled, "remove_me: account deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_doctors(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let doctors = state.identity_repo.list_doctors().await?;
    Ok(Json(doctors))
}
