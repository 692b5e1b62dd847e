use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::helpers::{ApiResult, not_found, validation};
use crate::models::{FilterResponse, Generation, PokemonSummary, PokemonType};

pub const EMPTY_TERM_MESSAGE: &str = "Tapez un nom ou un numéro de Pokémon pour lancer la recherche.";

/// Lectures du catalogue distant. Aucun état local.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Correspondance exacte par nom ou numéro.
    async fn search_by_term(&self, term: &str) -> ApiResult<PokemonSummary>;

    /// Générations et type se combinent en ET côté serveur. Aucun défaut appliqué ici.
    async fn filter(
        &self,
        generation: Option<Generation>,
        pokemon_type: Option<PokemonType>,
    ) -> ApiResult<FilterResponse>;

    async fn fetch_by_id(&self, id: u32) -> ApiResult<PokemonSummary>;
}

#[derive(Serialize)]
struct FilterQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    generation: Option<u8>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pokemon_type: Option<String>,
}

#[derive(Clone)]
pub struct HttpCatalog {
    api: ApiClient,
}

impl HttpCatalog {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

/// Normalise le terme saisi ; vide = rejet avant tout appel réseau.
pub fn normalize_term(term: &str) -> ApiResult<String> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Err(validation(EMPTY_TERM_MESSAGE));
    }
    Ok(term)
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn search_by_term(&self, term: &str) -> ApiResult<PokemonSummary> {
        let term = normalize_term(term)?;
        debug!(%term, "recherche manuelle");
        self.api
            .get_segments(&["pokemon", "search", term.as_str()], None)
            .await
            .map_err(|e| match e {
                ClientError::NotFound(msg) if msg.is_empty() => {
                    not_found(format!("Pokémon '{term}' introuvable."))
                }
                other => other,
            })
    }

    async fn filter(
        &self,
        generation: Option<Generation>,
        pokemon_type: Option<PokemonType>,
    ) -> ApiResult<FilterResponse> {
        let query = FilterQuery {
            generation: generation.map(Generation::get),
            pokemon_type: pokemon_type.map(PokemonType::query_value),
        };
        debug!(?generation, ?pokemon_type, "filtre catalogue");
        self.api.get_with_query("/pokemon/filter", &query, None).await
    }

    async fn fetch_by_id(&self, id: u32) -> ApiResult<PokemonSummary> {
        let id = id.to_string();
        self.api
            .get_segments(&["pokemon", "search", id.as_str()], None)
            .await
    }
}
