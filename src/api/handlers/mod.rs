pub mod appointment;
pub mod availability;
pub mod health;
pub mod identity;
pub mod time_slot;
pub mod waitlist;
