use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use super::availability::SlotKey;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WaitlistEntry {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time_slot_id: String,
    pub added_at: DateTime<Utc>,
}

impl WaitlistEntry {
    pub fn new(patient_id: String, key: &SlotKey) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id,
            doctor_id: key.doctor_id.clone(),
            date: key.date,
            time_slot_id: key.time_slot_id.clone(),
            added_at: Utc::now(),
        }
    }
}
