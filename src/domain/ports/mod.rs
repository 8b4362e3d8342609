use crate::domain::models::{
    user::{Identity, Role, DoctorSummary}, time_slot::TimeSlot,
    availability::{Availability, AvailabilityFilter},
    appointment::{Appointment, AppointmentSearch, BookingOutcome, BookingRequest, CancellationOutcome},
    waitlist::WaitlistEntry,
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Upserts the user row for `username` with `role` and get-or-creates the
    /// profiles the role calls for.
    async fn provision(&self, username: &str, role: Role) -> Result<Identity, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError>;
    async fn list_doctors(&self) -> Result<Vec<DoctorSummary>, AppError>;
    async fn delete(&self, user_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait TimeSlotRepository: Send + Sync {
    /// Get-or-create on (start_time, end_time). Returns how many rows were inserted.
    async fn seed(&self, slots: &[TimeSlot]) -> Result<u64, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<TimeSlot>, AppError>;
    async fn list(&self) -> Result<Vec<TimeSlot>, AppError>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn create(&self, availability: &Availability) -> Result<Availability, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Availability>, AppError>;
    async fn list_open(&self, filter: &AvailabilityFilter) -> Result<Vec<Availability>, AppError>;
    async fn update(&self, availability: &Availability) -> Result<Availability, AppError>;
    async fn delete(&self, availability: &Availability) -> Result<(), AppError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Runs the create path of the booking coordinator in one transaction.
    async fn book(&self, request: &BookingRequest) -> Result<BookingOutcome, AppError>;
    /// Runs the cancellation path: delete, then release or promote, in one transaction.
    async fn cancel(&self, appointment: &Appointment) -> Result<CancellationOutcome, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, AppError>;
    async fn list_for_participant(&self, patient_id: Option<&str>, doctor_id: Option<&str>) -> Result<Vec<Appointment>, AppError>;
    async fn search(&self, search: &AppointmentSearch) -> Result<Vec<Appointment>, AppError>;
}

#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<WaitlistEntry>, AppError>;
    async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<WaitlistEntry>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}
