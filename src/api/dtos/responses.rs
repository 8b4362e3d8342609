use serde::Serialize;
use crate::domain::models::waitlist::WaitlistEntry;

#[derive(Serialize)]
pub struct WaitlistResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub waitlist_entry: WaitlistEntry,
}

impl WaitlistResponse {
    pub fn queued(entry: WaitlistEntry) -> Self {
        Self {
            status: "queued",
            message: "Slot is taken; you have been added to the waitlist",
            waitlist_entry: entry,
        }
    }

    pub fn already_queued(entry: WaitlistEntry) -> Self {
        Self {
            status: "already_queued",
            message: "You are already on the waitlist for this slot",
            waitlist_entry: entry,
        }
    }
}
