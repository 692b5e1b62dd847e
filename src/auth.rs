//! Détenteur de l'état d'authentification : jeton Bearer, profil courant et
//! flux des changements d'utilisateur.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::helpers::{ApiResult, unauthorized, validation};
use crate::models::{ApiMessage, LoginResponse, LoginUser, RegisterUser, UserProfile};
use crate::store::{KeyValueStore, TOKEN_KEY, USER_KEY};

pub struct AuthState {
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    user_tx: watch::Sender<Option<UserProfile>>,
}

impl AuthState {
    /// Reprend la session persistée si elle est complète et lisible, sinon l'efface.
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        let user = restore_session(store.as_ref());
        let (user_tx, _) = watch::channel(user);
        Self {
            api,
            store,
            user_tx,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<UserProfile> {
        let body = LoginUser {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let res: LoginResponse = self
            .api
            .post("/login", &body, None)
            .await
            .map_err(|e| match e {
                ClientError::Network(msg) => unauthorized(format!("Serveur injoignable: {msg}")),
                ClientError::Server { message, .. } | ClientError::NotFound(message) => {
                    unauthorized(message)
                }
                other => other,
            })?;

        let Some(token) = res.bearer() else {
            return Err(unauthorized("Réponse de connexion sans jeton."));
        };
        let user = res
            .user
            .clone()
            .unwrap_or_else(|| UserProfile::from_email(&body.email));

        // Profil d'abord : un jeton seul ne doit jamais rester stocké.
        let stored = self
            .persist_user(&user)
            .and_then(|()| self.store.set(TOKEN_KEY, token));
        if let Err(e) = stored {
            warn!("session non enregistrée: {e}");
            clear_session(self.store.as_ref());
            self.user_tx.send_replace(None);
            return Err(e);
        }
        info!(email = %user.email, "connecté");
        self.user_tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Crée le compte sans ouvrir de session ; renvoie le message du serveur.
    pub async fn register(&self, payload: &RegisterUser) -> ApiResult<String> {
        let required = [
            &payload.name,
            &payload.nickname,
            &payload.email,
            &payload.password,
            &payload.confirm_password,
        ];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(validation("Tous les champs sont obligatoires."));
        }
        if payload.password != payload.confirm_password {
            return Err(validation("Les mots de passe ne correspondent pas."));
        }

        let ack: Option<ApiMessage> = self.api.post("/register", payload, None).await?;
        Ok(ack
            .and_then(|a| a.msg)
            .unwrap_or_else(|| "Compte créé.".into()))
    }

    /// Idempotent : sans session, ré-émet simplement `None`.
    pub fn logout(&self) {
        clear_session(self.store.as_ref());
        self.user_tx.send_replace(None);
        info!("déconnecté");
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.user_tx.borrow().clone()
    }

    /// Le récepteur voit la valeur courante puis chaque changement.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.user_tx.subscribe()
    }

    /// Remplace le profil courant (après une mise à jour du profil).
    pub fn set_user(&self, user: UserProfile) -> ApiResult<()> {
        self.persist_user(&user)?;
        self.user_tx.send_replace(Some(user));
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user_tx
            .borrow()
            .as_ref()
            .is_some_and(UserProfile::is_admin)
    }

    /// Valeur de l'en-tête `Authorization`, absente sans jeton.
    pub fn auth_header(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {t}"))
    }

    /// Comme [`auth_header`](Self::auth_header) mais échoue sans session.
    pub fn require_header(&self) -> ApiResult<String> {
        self.auth_header()
            .ok_or_else(|| unauthorized("Aucune session active."))
    }

    fn persist_user(&self, user: &UserProfile) -> ApiResult<()> {
        let raw = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &raw)
    }
}

fn restore_session(store: &dyn KeyValueStore) -> Option<UserProfile> {
    let token = store.get(TOKEN_KEY).filter(|t| !t.is_empty());
    let raw = store.get(USER_KEY);
    let user = match (&token, raw) {
        (Some(_), Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("profil persisté illisible, session ignorée: {e}");
                None
            }
        },
        (None, None) => return None,
        _ => None,
    };
    if user.is_none() {
        clear_session(store);
    }
    user
}

fn clear_session(store: &dyn KeyValueStore) {
    for key in [TOKEN_KEY, USER_KEY] {
        if let Err(e) = store.remove(key) {
            warn!("effacement de '{key}' impossible: {e}");
        }
    }
}
