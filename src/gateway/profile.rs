use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::auth::AuthState;
use crate::helpers::{ApiResult, validation};
use crate::models::{ProfileUpdateResponse, UpdateProfile, UserProfile};

pub struct ProfileGateway {
    api: ApiClient,
    auth: Arc<AuthState>,
}

impl ProfileGateway {
    pub fn new(api: ApiClient, auth: Arc<AuthState>) -> Self {
        Self { api, auth }
    }

    pub async fn get_profile(&self) -> ApiResult<UserProfile> {
        let header = self.auth.require_header()?;
        self.api.get("/api/profile/", Some(&header)).await
    }

    /// Le profil renvoyé par le serveur remplace celui de la session.
    pub async fn update_profile(&self, update: &UpdateProfile) -> ApiResult<String> {
        if update.is_empty() {
            return Err(validation("Aucune modification à enregistrer."));
        }
        let header = self.auth.require_header()?;
        let res: ProfileUpdateResponse = self
            .api
            .put("/api/profile/", update, Some(&header))
            .await?;
        if let Some(user) = res.user {
            self.auth.set_user(user)?;
        }
        info!("profil mis à jour");
        Ok(res.msg.unwrap_or_else(|| "Profil mis à jour.".into()))
    }

    /// Réservé aux administrateurs : 403 devient `Forbidden`.
    pub async fn list_users(&self) -> ApiResult<Vec<UserProfile>> {
        let header = self.auth.require_header()?;
        self.api.get("/api/users", Some(&header)).await
    }
}
