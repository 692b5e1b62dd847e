use crate::error::ClientError;

pub type ApiResult<T> = Result<T, ClientError>;

pub fn validation(msg: impl Into<String>) -> ClientError {
    ClientError::Validation(msg.into())
}

pub fn not_found(msg: impl Into<String>) -> ClientError {
    ClientError::NotFound(msg.into())
}

pub fn unauthorized(msg: impl Into<String>) -> ClientError {
    ClientError::Auth(msg.into())
}

/// Extrait le message d'un corps d'erreur : `{"msg": ..}`, `{"error": ..}` ou texte brut.
pub fn message_from_body(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("msg")
            .or_else(|| value.get("error"))
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        Err(_) if !body.starts_with('<') => Some(body.to_string()),
        Err(_) => None,
    }
}

/// Le serveur signale l'équipe pleine par un 400 dont le message cite la limite de 6.
pub fn is_capacity_message(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    lower.contains("6 pokémon") || lower.contains("6 pokemon")
}
