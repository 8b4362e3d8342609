use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Closed set of roles a caller can hold. Built from the two role claims of
/// the identity token, so "neither" and "both" are explicit states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Doctor,
    Patient,
    DoctorAndPatient,
    Unassigned,
}

impl Role {
    pub fn from_flags(is_doctor: bool, is_patient: bool) -> Self {
        match (is_doctor, is_patient) {
            (true, true) => Role::DoctorAndPatient,
            (true, false) => Role::Doctor,
            (false, true) => Role::Patient,
            (false, false) => Role::Unassigned,
        }
    }

    pub fn is_doctor(self) -> bool {
        matches!(self, Role::Doctor | Role::DoctorAndPatient)
    }

    pub fn is_patient(self) -> bool {
        matches!(self, Role::Patient | Role::DoctorAndPatient)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Doctor => "DOCTOR",
            Role::Patient => "PATIENT",
            Role::DoctorAndPatient => "DOCTOR_AND_PATIENT",
            Role::Unassigned => "UNASSIGNED",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DOCTOR" => Ok(Role::Doctor),
            "PATIENT" => Ok(Role::Patient),
            "DOCTOR_AND_PATIENT" => Ok(Role::DoctorAndPatient),
            "UNASSIGNED" => Ok(Role::Unassigned),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            role: role.as_str().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Case-folded form stored beside the username and matched by search.
/// Folding happens here rather than in SQL, whose `LOWER` only covers ASCII.
pub fn fold_username(username: &str) -> String {
    username.to_lowercase()
}

/// A doctor or patient profile row. Both tables share this shape.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(user_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// The authenticated caller, as seen by the booking logic.
#[derive(Debug, Serialize, Clone)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
}

impl Identity {
    pub fn is_patient(&self, patient_id: &str) -> bool {
        self.role.is_patient() && self.patient_id.as_deref() == Some(patient_id)
    }

    pub fn is_doctor(&self, doctor_id: &str) -> bool {
        self.role.is_doctor() && self.doctor_id.as_deref() == Some(doctor_id)
    }
}

/// Joined user + profile ids, as read back from storage.
#[derive(Debug, FromRow)]
pub struct IdentityRow {
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = String;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            role: row.role.parse()?,
            user_id: row.user_id,
            username: row.username,
            doctor_id: row.doctor_id,
            patient_id: row.patient_id,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct DoctorSummary {
    pub id: String,
    pub username: String,
}
