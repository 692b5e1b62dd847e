use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_STORE_PATH: &str = ".pokedex_session.json";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    /// Fichier du stockage durable ; `None` = stockage en mémoire.
    pub store_path: Option<PathBuf>,
    pub request_timeout: Duration,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            store_path: Some(PathBuf::from(DEFAULT_STORE_PATH)),
            request_timeout: Duration::from_secs(10),
            log_level: "info".into(),
        }
    }
}

impl ClientConfig {
    /// Lit `.env` puis les variables `POKEDEX_*`. Une valeur illisible garde le défaut.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            api_url: std::env::var("POKEDEX_API_URL").unwrap_or(defaults.api_url),
            store_path: std::env::var("POKEDEX_STORE")
                .ok()
                .map(PathBuf::from)
                .or(defaults.store_path),
            request_timeout: timeout_secs()
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            log_level: std::env::var("POKEDEX_LOG").unwrap_or(defaults.log_level),
        };
        debug!(api_url = %config.api_url, "configuration chargée");
        config
    }

    /// Configuration sans persistance, pour les tests et les usages éphémères.
    pub fn in_memory(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            store_path: None,
            ..Self::default()
        }
    }
}

fn timeout_secs() -> Option<u64> {
    std::env::var("POKEDEX_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|s| *s > 0)
}
