use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserProfile {
    /// Profil minimal quand la connexion ne renvoie pas d'utilisateur.
    pub fn from_email(email: &str) -> Self {
        let name = match email.split_once('@') {
            Some((local, _)) if !local.is_empty() => local.to_string(),
            _ if !email.is_empty() => email.to_string(),
            _ => "Utilisateur".to_string(),
        };
        Self {
            name,
            email: email.to_string(),
            ..Self::default()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin || self.role.as_deref() == Some("admin")
    }

    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterUser {
    pub name: String,
    pub nickname: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

/// Champs vides ou absents = inchangés côté serveur.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.nickname, &self.password]
            .iter()
            .all(|f| f.as_deref().is_none_or(str::is_empty))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateResponse {
    pub msg: Option<String>,
    pub user: Option<UserProfile>,
}

/// Accusé de réception générique `{"msg": ...}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    pub msg: Option<String>,
}
