pub mod sqlite_identity_repo;
pub mod sqlite_time_slot_repo;
pub mod sqlite_availability_repo;
pub mod sqlite_appointment_repo;
pub mod sqlite_waitlist_repo;

pub mod postgres_identity_repo;
pub mod postgres_time_slot_repo;
pub mod postgres_availability_repo;
pub mod postgres_appointment_repo;
pub mod postgres_waitlist_repo;
