use serde::{Deserialize, Serialize};

use super::user::Role;

/// Claims of an access token issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the caller.
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,

    #[serde(default)]
    pub is_doctor: bool,

    #[serde(default)]
    pub is_patient: bool,
}

impl Claims {
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_doctor, self.is_patient)
    }
}
