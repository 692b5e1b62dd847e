//! Erreurs du client.
//!
//! Chaque appel distant est une frontière de propagation : l'appelant récupère
//! un `ClientError`, le journalise et n'affiche que `user_message()`.

use reqwest::StatusCode;

pub const NOT_FOUND_MESSAGE: &str = "Ressource introuvable.";
pub const GENERIC_MESSAGE: &str = "Une erreur est survenue.";
pub const CAPACITY_MESSAGE: &str =
    "Votre équipe est complète (6 Pokémon maximum). Retirez-en un avant d'en ajouter un autre.";
pub const SESSION_MESSAGE: &str = "Session expirée. Reconnectez-vous.";
pub const FORBIDDEN_MESSAGE: &str = "Accès refusé. Réservé aux administrateurs.";
pub const NETWORK_MESSAGE: &str = "Impossible de joindre le serveur. Vérifiez que l'API est démarrée.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Rejeté localement, aucune requête envoyée.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// 401, session absente ou expirée.
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Forbidden(String),
    /// Équipe déjà à 6 membres.
    #[error("{0}")]
    Capacity(String),
    /// Serveur injoignable (statut 0 côté navigateur).
    #[error("réseau: {0}")]
    Network(String),
    #[error("erreur serveur ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("réponse illisible: {0}")]
    Decode(String),
    #[error("stockage local: {0}")]
    Storage(String),
}

impl ClientError {
    /// Traduit une réponse HTTP en échec. `message` vient du corps (`msg` ou `error`).
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Auth(message.unwrap_or_else(|| SESSION_MESSAGE.into()))
            }
            StatusCode::FORBIDDEN => {
                ClientError::Forbidden(message.unwrap_or_else(|| FORBIDDEN_MESSAGE.into()))
            }
            // Message vide : l'appelant connaît mieux le contexte.
            StatusCode::NOT_FOUND => ClientError::NotFound(message.unwrap_or_default()),
            other => ClientError::Server {
                status: other.as_u16(),
                message: message.unwrap_or_else(|| {
                    other.canonical_reason().unwrap_or("erreur inconnue").into()
                }),
            },
        }
    }

    /// Message court destiné à l'utilisateur.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NotFound(msg) if msg.is_empty() => NOT_FOUND_MESSAGE.into(),
            ClientError::Validation(msg) | ClientError::NotFound(msg) => msg.clone(),
            ClientError::Capacity(_) => CAPACITY_MESSAGE.into(),
            ClientError::Auth(_) => SESSION_MESSAGE.into(),
            ClientError::Forbidden(_) => FORBIDDEN_MESSAGE.into(),
            ClientError::Network(_) => NETWORK_MESSAGE.into(),
            ClientError::Server { .. } | ClientError::Decode(_) | ClientError::Storage(_) => {
                GENERIC_MESSAGE.into()
            }
        }
    }

    pub fn is_capacity(&self) -> bool {
        matches!(self, ClientError::Capacity(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::from_status(status, None)
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}
