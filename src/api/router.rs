use axum::{
    body::Body,
    extract::Request,
    routing::{get, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, identity, time_slot, availability, appointment, waitlist};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Identity
        .route("/api/v1/me", get(identity::me).delete(identity::remove_me))
        .route("/api/v1/doctors", get(identity::list_doctors))

        // Slot catalog
        .route("/api/v1/timeslots", get(time_slot::list_time_slots))
        .route("/api/v1/timeslots/{id}", get(time_slot::get_time_slot))

        // Availability
        .route("/api/v1/availabilities", get(availability::list_availabilities).post(availability::create_availability))
        .route(
            "/api/v1/availabilities/{id}",
            get(availability::get_availability)
                .put(availability::update_availability)
                .delete(availability::delete_availability),
        )

        // Appointments
        .route("/api/v1/appointments", get(appointment::list_appointments).post(appointment::create_appointment))
        .route("/api/v1/appointments/search", get(appointment::search_appointments))
        .route("/api/v1/appointments/{id}", get(appointment::get_appointment).delete(appointment::cancel_appointment))

        // Waitlist
        .route("/api/v1/waitlist", get(waitlist::list_waitlist))
        .route("/api/v1/waitlist/{id}", delete(waitlist::withdraw_waitlist_entry))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        username = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
