use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::NaiveTime;
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl TimeSlot {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time,
        }
    }
}
