use axum::{
    extract::{rejection::JsonRejection, State, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CreateAppointmentRequest, SearchQuery, non_blank, parse_date};
use crate::api::dtos::responses::WaitlistResponse;
use crate::domain::models::appointment::{AppointmentSearch, BookingOutcome, CancellationOutcome};
use crate::domain::services::booking::{is_participant, require_patient};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    // role is checked before the body
    require_patient(&identity)?;
    let Json(payload) = payload?;
    let date = parse_date(&payload.date)?;

    let outcome = state.booking_service
        .book(&identity, payload.doctor_id, date, payload.time_slot_id)
        .await?;

    let response = match outcome {
        BookingOutcome::Confirmed(appointment) => (StatusCode::CREATED, Json(appointment)).into_response(),
        BookingOutcome::Queued(entry) => (StatusCode::ACCEPTED, Json(WaitlistResponse::queued(entry))).into_response(),
        BookingOutcome::AlreadyQueued(entry) => (StatusCode::OK, Json(WaitlistResponse::already_queued(entry))).into_response(),
    };
    Ok(response)
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let patient_id = identity.patient_id.as_deref().filter(|_| identity.role.is_patient());
    let doctor_id = identity.doctor_id.as_deref().filter(|_| identity.role.is_doctor());

    let appointments = if patient_id.is_none() && doctor_id.is_none() {
        Vec::new()
    } else {
        state.appointment_repo.list_for_participant(patient_id, doctor_id).await?
    };
    Ok(Json(appointments))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.appointment_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Appointment not found".into()))?;

    if !is_participant(&identity, &appointment) {
        return Err(AppError::Forbidden("You do not have access to this appointment".into()));
    }
    Ok(Json(appointment))
}

/// 204 when the slot went back to the open pool, 201 with the promoted
/// appointment when a waiting patient took it over.
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let response = match state.booking_service.cancel(&identity, &id).await? {
        CancellationOutcome::Released => StatusCode::NO_CONTENT.into_response(),
        CancellationOutcome::Promoted(appointment) => (StatusCode::CREATED, Json(appointment)).into_response(),
    };
    Ok(response)
}

pub async fn search_appointments(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let search = AppointmentSearch {
        doctor_username: non_blank(query.doctor),
        patient_username: non_blank(query.patient),
        limit: state.config.search_limit(query.limit),
    };

    let results = state.appointment_repo.search(&search).await?;
    info!(username = %identity.username, results = results.len(), "search_appointments");
    Ok(Json(results))
}
