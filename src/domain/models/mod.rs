pub mod appointment;
pub mod auth;
pub mod availability;
pub mod time_slot;
pub mod user;
pub mod waitlist;
