use chrono::NaiveDate;
use serde::Deserialize;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct CreateAvailabilityRequest {
    pub date: String,
    #[serde(alias = "time_slot")]
    pub time_slot_id: String,
}

#[derive(Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub date: Option<String>,
    #[serde(alias = "time_slot")]
    pub time_slot_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub doctor: Option<String>,
    pub date: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(alias = "doctor")]
    pub doctor_id: String,
    pub date: String,
    #[serde(alias = "time_slot")]
    pub time_slot_id: String,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub doctor: Option<String>,
    pub patient: Option<String>,
    pub limit: Option<i64>,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

/// Blank query parameters count as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
