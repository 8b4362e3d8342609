use axum::{extract::{rejection::JsonRejection, State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{
    AvailabilityQuery, CreateAvailabilityRequest, UpdateAvailabilityRequest, non_blank, parse_date,
};
use crate::domain::models::availability::{Availability, AvailabilityFilter};
use crate::domain::models::user::Identity;
use crate::domain::services::booking::require_doctor;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

async fn ensure_time_slot(state: &AppState, time_slot_id: &str) -> Result<(), AppError> {
    state.time_slot_repo.find_by_id(time_slot_id).await?
        .ok_or(AppError::Validation("Unknown time slot".into()))?;
    Ok(())
}

async fn load_owned(state: &AppState, identity: &Identity, id: &str) -> Result<Availability, AppError> {
    let doctor_id = require_doctor(identity)?;
    let availability = state.availability_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Availability not found".into()))?;

    if availability.doctor_id != doctor_id {
        return Err(AppError::Forbidden("You can only manage your own availability".into()));
    }
    Ok(availability)
}

pub async fn list_availabilities(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = AvailabilityFilter {
        doctor_id: non_blank(query.doctor),
        date: non_blank(query.date).as_deref().map(parse_date).transpose()?,
    };

    let availabilities = state.availability_repo.list_open(&filter).await?;
    Ok(Json(availabilities))
}

pub async fn create_availability(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<CreateAvailabilityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let doctor_id = require_doctor(&identity)?.to_string();
    let Json(payload) = payload?;
    let date = parse_date(&payload.date)?;
    ensure_time_slot(&state, &payload.time_slot_id).await?;

    let created = state.availability_repo
        .create(&Availability::new(doctor_id, date, payload.time_slot_id))
        .await?;

    info!(availability_id = %created.id, date = %created.date, "Availability published");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let availability = state.availability_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Availability not found".into()))?;
    Ok(Json(availability))
}

pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAvailabilityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut availability = load_owned(&state, &identity, &id).await?;
    let Json(payload) = payload?;

    if let Some(date) = payload.date {
        availability.date = parse_date(&date)?;
    }
    if let Some(time_slot_id) = payload.time_slot_id {
        ensure_time_slot(&state, &time_slot_id).await?;
        availability.time_slot_id = time_slot_id;
    }

    let updated = state.availability_repo.update(&availability).await?;
    info!(availability_id = %updated.id, "Availability moved");
    Ok(Json(updated))
}

pub async fn delete_availability(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let availability = load_owned(&state, &identity, &id).await?;
    state.availability_repo.delete(&availability).await?;

    info!(availability_id = %id, "Availability withdrawn");
    Ok(StatusCode::NO_CONTENT)
}
