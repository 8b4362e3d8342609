use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Identifies one bookable unit: a doctor's slot on a given date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotKey {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time_slot_id: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Availability {
    pub id: String,
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time_slot_id: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl Availability {
    pub fn new(doctor_id: String, date: NaiveDate, time_slot_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            doctor_id,
            date,
            time_slot_id,
            is_available: true,
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

#[derive(Debug, Default)]
pub struct AvailabilityFilter {
    pub doctor_id: Option<String>,
    pub date: Option<NaiveDate>,
}
