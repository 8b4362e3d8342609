use std::sync::Arc;
use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::domain::{
    models::{
        user::Identity,
        availability::SlotKey,
        appointment::{Appointment, BookingOutcome, BookingRequest, CancellationOutcome},
    },
    ports::{AppointmentRepository, IdentityRepository},
};
use crate::error::AppError;

/// Front door of the booking coordinator: permission checks, then the
/// transactional create/cancel paths of the appointment ledger.
pub struct BookingService {
    appointments: Arc<dyn AppointmentRepository>,
    identities: Arc<dyn IdentityRepository>,
}

impl BookingService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, identities: Arc<dyn IdentityRepository>) -> Self {
        Self { appointments, identities }
    }

    pub async fn book(
        &self,
        identity: &Identity,
        doctor_id: String,
        date: NaiveDate,
        time_slot_id: String,
    ) -> Result<BookingOutcome, AppError> {
        let patient_id = require_patient(identity)?.to_string();

        let request = BookingRequest {
            patient_id,
            slot: SlotKey { doctor_id, date, time_slot_id },
        };

        let outcome = self.appointments.book(&request).await?;

        match &outcome {
            BookingOutcome::Confirmed(appointment) => info!(
                appointment_id = %appointment.id, doctor_id = %appointment.doctor_id, date = %appointment.date,
                "Appointment confirmed"
            ),
            BookingOutcome::Queued(entry) => info!(
                waitlist_id = %entry.id, doctor_id = %entry.doctor_id, date = %entry.date,
                "Slot taken, patient added to waitlist"
            ),
            BookingOutcome::AlreadyQueued(entry) => info!(waitlist_id = %entry.id, "Patient already on waitlist"),
        }

        Ok(outcome)
    }

    pub async fn cancel(&self, identity: &Identity, appointment_id: &str) -> Result<CancellationOutcome, AppError> {
        let appointment = self.appointments.find_by_id(appointment_id).await?
            .ok_or(AppError::NotFound("Appointment not found".into()))?;

        authorize_cancellation(identity, &appointment)?;

        let outcome = self.appointments.cancel(&appointment).await?;

        match &outcome {
            CancellationOutcome::Released => info!(appointment_id = %appointment.id, "Appointment cancelled, slot released"),
            CancellationOutcome::Promoted(promoted) => info!(
                appointment_id = %appointment.id, promoted_id = %promoted.id, patient_id = %promoted.patient_id,
                "Appointment cancelled, waitlist promoted"
            ),
        }

        Ok(outcome)
    }

    /// Cancels everything the caller holds as a patient, so each freed slot
    /// is released or promoted, then deletes the user. Profile rows and the
    /// remaining dependent rows go with it through the schema's cascades.
    ///
    /// Each cancellation commits on its own. If one fails the user row is
    /// kept, so calling again finishes the appointments that are left.
    pub async fn remove_account(&self, identity: &Identity) -> Result<usize, AppError> {
        let mut cancelled = 0;

        if let Some(patient_id) = identity.patient_id.as_deref() {
            let held = self.appointments.list_for_participant(Some(patient_id), None).await?;
            let total = held.len();
            for appointment in held {
                if let Err(e) = self.appointments.cancel(&appointment).await {
                    error!(
                        username = %identity.username, appointment_id = %appointment.id, cancelled, total,
                        "Account removal stopped partway, user kept"
                    );
                    return Err(e);
                }
                cancelled += 1;
            }
        }

        if let Err(e) = self.identities.delete(&identity.user_id).await {
            error!(username = %identity.username, cancelled, "Appointments cancelled but user deletion failed");
            return Err(e);
        }
        warn!(username = %identity.username, cancelled, "Account removed");
        Ok(cancelled)
    }
}

pub fn require_patient(identity: &Identity) -> Result<&str, AppError> {
    match identity.patient_id.as_deref() {
        Some(id) if identity.role.is_patient() => Ok(id),
        _ => Err(AppError::Forbidden("Only patients can perform this action".into())),
    }
}

pub fn require_doctor(identity: &Identity) -> Result<&str, AppError> {
    match identity.doctor_id.as_deref() {
        Some(id) if identity.role.is_doctor() => Ok(id),
        _ => Err(AppError::Forbidden("Only doctors can perform this action".into())),
    }
}

/// The booking patient or the assigned doctor may cancel. A caller holding
/// both roles qualifies through either profile.
pub fn authorize_cancellation(identity: &Identity, appointment: &Appointment) -> Result<(), AppError> {
    if is_participant(identity, appointment) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You do not have permission to cancel this appointment".into()))
    }
}

pub fn is_participant(identity: &Identity, appointment: &Appointment) -> bool {
    identity.is_patient(&appointment.patient_id) || identity.is_doctor(&appointment.doctor_id)
}
