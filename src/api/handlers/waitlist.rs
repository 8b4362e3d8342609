use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::domain::services::booking::require_patient;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_waitlist(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let patient_id = require_patient(&identity)?;
    let entries = state.waitlist_repo.list_for_patient(patient_id).await?;
    Ok(Json(entries))
}

pub async fn withdraw_waitlist_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.waitlist_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Waitlist entry not found".into()))?;

    if !identity.is_patient(&entry.patient_id) {
        return Err(AppError::Forbidden("You can only withdraw your own waitlist entries".into()));
    }

    state.waitlist_repo.delete(&id).await?;
    info!(waitlist_id = %id, "Waitlist entry withdrawn");
    Ok(StatusCode::NO_CONTENT)
}
