use std::sync::Arc;
use crate::domain::ports::{
    IdentityRepository, TimeSlotRepository, AvailabilityRepository,
    AppointmentRepository, WaitlistRepository,
};
use crate::domain::services::booking::BookingService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub identity_repo: Arc<dyn IdentityRepository>,
    pub time_slot_repo: Arc<dyn TimeSlotRepository>,
    pub availability_repo: Arc<dyn AvailabilityRepository>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
    pub waitlist_repo: Arc<dyn WaitlistRepository>,
    pub booking_service: Arc<BookingService>,
}
