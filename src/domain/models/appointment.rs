use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use super::availability::SlotKey;
use super::user::fold_username;
use super::waitlist::WaitlistEntry;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time_slot_id: String,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(patient_id: String, key: &SlotKey) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id,
            doctor_id: key.doctor_id.clone(),
            date: key.date,
            time_slot_id: key.time_slot_id.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey {
            doctor_id: self.doctor_id.clone(),
            date: self.date,
            time_slot_id: self.time_slot_id.clone(),
        }
    }
}

/// A patient asking for a doctor's slot.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub patient_id: String,
    pub slot: SlotKey,
}

#[derive(Debug)]
pub enum BookingOutcome {
    Confirmed(Appointment),
    Queued(WaitlistEntry),
    AlreadyQueued(WaitlistEntry),
}

#[derive(Debug)]
pub enum CancellationOutcome {
    /// Nobody was waiting; the slot is bookable again.
    Released,
    /// The earliest eligible waitlisted patient now holds the slot.
    Promoted(Appointment),
}

#[derive(Debug)]
pub struct AppointmentSearch {
    pub doctor_username: Option<String>,
    pub patient_username: Option<String>,
    pub limit: i64,
}

impl AppointmentSearch {
    /// Case-folded `%…%` LIKE pattern for the doctor filter, wildcards escaped with `\`.
    pub fn doctor_pattern(&self) -> Option<String> {
        self.doctor_username.as_deref().map(contains_pattern)
    }

    pub fn patient_pattern(&self) -> Option<String> {
        self.patient_username.as_deref().map(contains_pattern)
    }
}

fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in fold_username(needle).chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_patterns_are_lowercased_and_escaped() {
        let search = AppointmentSearch {
            doctor_username: Some("Dr_House".into()),
            patient_username: None,
            limit: 10,
        };

        assert_eq!(search.doctor_pattern().as_deref(), Some("%dr\\_house%"));
        assert_eq!(search.patient_pattern(), None);
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("Élise"), "%élise%");
    }
}
