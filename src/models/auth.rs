use serde::{Deserialize, Serialize};

use crate::models::user::UserProfile;

#[derive(Debug, Clone, Serialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    /// Ancien format de l'API.
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub msg: Option<String>,
}

impl LoginResponse {
    pub fn bearer(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .or(self.token.as_deref())
            .filter(|t| !t.is_empty())
    }
}
