use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_time_slots(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let slots = state.time_slot_repo.list().await?;
    Ok(Json(slots))
}

pub async fn get_time_slot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let slot = state.time_slot_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Time slot not found".into()))?;
    Ok(Json(slot))
}
