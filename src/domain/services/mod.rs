pub mod booking;
pub mod reconciliation;
pub mod time_slots;
