//! Liste du Pokédex : fusionne le catalogue distant avec les favoris et
//! l'équipe, applique l'ordre d'affichage et aiguille les vues par catégorie.
//!
//! Chaque requête reçoit un numéro de séquence par contexte (filtre, détails) ;
//! seule la dernière émise peut écrire son résultat.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::error::ClientError;
use crate::gateway::CatalogSource;
use crate::gateway::catalog::normalize_term;
use crate::helpers::ApiResult;
use crate::membership::{CollectionKind, MembershipCollection};
use crate::models::{Generation, PokemonSummary, PokemonType};

const FILTER_FAILED: &str = "Erreur lors de la recherche des Pokémon.";
const DETAILS_FAILED: &str = "Erreur lors du chargement des détails.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    All,
    Favorites,
    Team,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::All => "all",
            Category::Favorites => "favorites",
            Category::Team => "team",
        })
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "tous" => Ok(Category::All),
            "favorites" | "favoris" => Ok(Category::Favorites),
            "team" | "equipe" | "équipe" => Ok(Category::Team),
            other => Err(format!("catégorie inconnue: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub generation: Option<Generation>,
    pub pokemon_type: Option<PokemonType>,
    pub search_term: String,
    pub category: Category,
}

/// Résultat courant, remplacé en bloc à chaque requête.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub items: Vec<PokemonSummary>,
    pub count: usize,
    pub message: String,
}

impl CatalogPage {
    fn failed(message: String) -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub pokemon: PokemonSummary,
    pub in_team: bool,
    pub favorite: bool,
}

enum PendingRequest {
    Project(CollectionKind),
    Search(String),
    Filter(Option<Generation>, Option<PokemonType>),
}

/// Équipe d'abord, puis favoris, puis l'ordre du serveur (tri stable).
pub fn rank_by_membership(
    items: &mut [PokemonSummary],
    in_team: impl Fn(u32) -> bool,
    favorite: impl Fn(u32) -> bool,
) {
    items.sort_by_key(|p| (!in_team(p.id), !favorite(p.id)));
}

pub struct PokemonList {
    catalog: Arc<dyn CatalogSource>,
    favorites: Arc<MembershipCollection>,
    team: Arc<MembershipCollection>,
    filters: Mutex<FilterState>,
    page: Mutex<CatalogPage>,
    loading: AtomicBool,
    loading_details: AtomicBool,
    filter_seq: AtomicU64,
    details_seq: AtomicU64,
    debounce_seq: AtomicU64,
}

impl PokemonList {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        favorites: Arc<MembershipCollection>,
        team: Arc<MembershipCollection>,
    ) -> Self {
        Self {
            catalog,
            favorites,
            team,
            filters: Mutex::new(FilterState::default()),
            page: Mutex::new(CatalogPage::default()),
            loading: AtomicBool::new(false),
            loading_details: AtomicBool::new(false),
            filter_seq: AtomicU64::new(0),
            details_seq: AtomicU64::new(0),
            debounce_seq: AtomicU64::new(0),
        }
    }

    pub fn filters(&self) -> FilterState {
        self.filters.lock().clone()
    }

    pub fn page(&self) -> CatalogPage {
        self.page.lock().clone()
    }

    pub fn message(&self) -> String {
        self.page.lock().message.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_loading_details(&self) -> bool {
        self.loading_details.load(Ordering::SeqCst)
    }

    pub fn favorites(&self) -> &MembershipCollection {
        &self.favorites
    }

    pub fn team(&self) -> &MembershipCollection {
        &self.team
    }

    /// Page courante avec les drapeaux d'appartenance à jour.
    pub fn entries(&self) -> Vec<ListEntry> {
        self.page
            .lock()
            .items
            .iter()
            .map(|p| ListEntry {
                in_team: self.team.contains(p.id),
                favorite: self.favorites.contains(p.id),
                pokemon: p.clone(),
            })
            .collect()
    }

    /// Première ouverture : génération 1, collections chargées, puis filtre.
    pub async fn initialize(&self) {
        {
            let mut filters = self.filters.lock();
            *filters = FilterState {
                generation: Some(Generation::DEFAULT),
                ..FilterState::default()
            };
        }
        let (favorites, team) = tokio::join!(self.favorites.load(), self.team.load());
        for (kind, res) in [(CollectionKind::Favorites, favorites), (CollectionKind::Team, team)] {
            if let Err(err) = res {
                warn!(kind = kind.label(), "collection non chargée: {err}");
            }
        }
        self.apply_filters().await;
    }

    /// N'échoue jamais : un échec vide la page et pose un message.
    pub async fn apply_filters(&self) {
        let seq = self.filter_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let request = {
            let mut filters = self.filters.lock();
            match filters.category {
                Category::Favorites => PendingRequest::Project(CollectionKind::Favorites),
                Category::Team => PendingRequest::Project(CollectionKind::Team),
                Category::All => {
                    let term = filters.search_term.trim().to_string();
                    if !term.is_empty() {
                        filters.generation = None;
                        filters.pokemon_type = None;
                        PendingRequest::Search(term)
                    } else {
                        if filters.generation.is_none() && filters.pokemon_type.is_none() {
                            filters.generation = Some(Generation::DEFAULT);
                        }
                        PendingRequest::Filter(filters.generation, filters.pokemon_type)
                    }
                }
            }
        };

        let page = match request {
            PendingRequest::Project(kind) => {
                let items = self.collection(kind).snapshot();
                CatalogPage {
                    count: items.len(),
                    items,
                    message: String::new(),
                }
            }
            PendingRequest::Search(term) => {
                self.loading.store(true, Ordering::SeqCst);
                match self.catalog.search_by_term(&term).await {
                    Ok(pokemon) => CatalogPage {
                        message: format!("Résultat pour : {}", pokemon.name),
                        items: vec![pokemon],
                        count: 1,
                    },
                    Err(err) => {
                        let fallback = format!("Pokémon '{term}' introuvable.");
                        CatalogPage::failed(report(&err, &fallback))
                    }
                }
            }
            PendingRequest::Filter(generation, pokemon_type) => {
                self.loading.store(true, Ordering::SeqCst);
                match self.catalog.filter(generation, pokemon_type).await {
                    Ok(res) => {
                        let mut items = res.results;
                        rank_by_membership(
                            &mut items,
                            |id| self.team.contains(id),
                            |id| self.favorites.contains(id),
                        );
                        CatalogPage {
                            items,
                            count: res.count,
                            message: res.msg.unwrap_or_default(),
                        }
                    }
                    Err(err) => CatalogPage::failed(report(&err, FILTER_FAILED)),
                }
            }
        };

        self.commit(seq, page);
    }

    /// N'émet la requête que si aucun autre appel n'est arrivé pendant `delay`.
    pub async fn apply_filters_debounced(&self, delay: Duration) {
        let ticket = self.debounce_seq.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(delay).await;
        if self.debounce_seq.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "filtre remplacé pendant l'attente");
            return;
        }
        self.apply_filters().await;
    }

    /// Remplace tous les critères d'un coup (ligne de commande).
    pub async fn set_filters(&self, filters: FilterState) {
        *self.filters.lock() = filters;
        self.apply_filters().await;
    }

    /// Recherche manuelle ; prioritaire sur génération et type.
    pub async fn search(&self, term: &str) {
        if let Err(err) = normalize_term(term) {
            self.page.lock().message = err.user_message();
            return;
        }
        {
            let mut filters = self.filters.lock();
            filters.search_term = term.trim().to_string();
            filters.category = Category::All;
        }
        self.apply_filters().await;
    }

    /// Re-sélectionner la génération active la désélectionne.
    pub async fn select_generation(&self, generation: Generation) {
        {
            let mut filters = self.filters.lock();
            filters.generation = (filters.generation != Some(generation)).then_some(generation);
            filters.search_term.clear();
            filters.category = Category::All;
        }
        self.apply_filters().await;
    }

    pub async fn select_type(&self, pokemon_type: PokemonType) {
        {
            let mut filters = self.filters.lock();
            filters.pokemon_type =
                (filters.pokemon_type != Some(pokemon_type)).then_some(pokemon_type);
            filters.search_term.clear();
            filters.category = Category::All;
        }
        self.apply_filters().await;
    }

    pub async fn select_category(&self, category: Category) {
        self.filters.lock().category = category;
        self.apply_filters().await;
    }

    /// Revient à la vue initiale (génération 1).
    pub async fn clear_filters(&self) {
        *self.filters.lock() = FilterState::default();
        self.apply_filters().await;
    }

    pub async fn toggle_favorite(&self, pokemon: &PokemonSummary) -> ApiResult<bool> {
        self.toggle(CollectionKind::Favorites, pokemon).await
    }

    pub async fn toggle_team(&self, pokemon: &PokemonSummary) -> ApiResult<bool> {
        self.toggle(CollectionKind::Team, pokemon).await
    }

    async fn toggle(&self, kind: CollectionKind, pokemon: &PokemonSummary) -> ApiResult<bool> {
        let res = self.collection(kind).toggle(pokemon).await;
        let message = match &res {
            Ok(true) => match kind {
                CollectionKind::Favorites => format!("{} ajouté aux favoris.", pokemon.name),
                CollectionKind::Team => format!("{} ajouté à l'équipe.", pokemon.name),
            },
            Ok(false) => match kind {
                CollectionKind::Favorites => format!("{} retiré des favoris.", pokemon.name),
                CollectionKind::Team => format!("{} retiré de l'équipe.", pokemon.name),
            },
            Err(err) => report(err, crate::error::GENERIC_MESSAGE),
        };

        let viewing = match self.filters.lock().category {
            Category::Favorites => Some(CollectionKind::Favorites),
            Category::Team => Some(CollectionKind::Team),
            Category::All => None,
        };
        if viewing == Some(kind) {
            self.apply_filters().await;
        }
        self.page.lock().message = message;
        res
    }

    /// Fiche détaillée ; `None` si la requête échoue ou a été dépassée.
    pub async fn view_details(&self, id: u32) -> Option<PokemonSummary> {
        let seq = self.details_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.loading_details.store(true, Ordering::SeqCst);

        let res = self.catalog.fetch_by_id(id).await;
        if self.details_seq.load(Ordering::SeqCst) != seq {
            debug!(id, "détails dépassés, ignorés");
            return None;
        }
        self.loading_details.store(false, Ordering::SeqCst);
        match res {
            Ok(pokemon) => Some(pokemon),
            Err(err) => {
                self.page.lock().message = report(&err, DETAILS_FAILED);
                None
            }
        }
    }

    /// État initial (déconnexion) ; les réponses en vol seront ignorées.
    pub fn reset(&self) {
        self.filter_seq.fetch_add(1, Ordering::SeqCst);
        self.details_seq.fetch_add(1, Ordering::SeqCst);
        self.debounce_seq.fetch_add(1, Ordering::SeqCst);
        *self.filters.lock() = FilterState::default();
        *self.page.lock() = CatalogPage::default();
        self.loading.store(false, Ordering::SeqCst);
        self.loading_details.store(false, Ordering::SeqCst);
    }

    fn collection(&self, kind: CollectionKind) -> &MembershipCollection {
        match kind {
            CollectionKind::Favorites => &self.favorites,
            CollectionKind::Team => &self.team,
        }
    }

    fn commit(&self, seq: u64, next: CatalogPage) -> bool {
        let mut page = self.page.lock();
        if self.filter_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "réponse dépassée, ignorée");
            return false;
        }
        *page = next;
        self.loading.store(false, Ordering::SeqCst);
        true
    }
}

/// Journalise l'erreur brute et renvoie le message à afficher.
fn report(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::NotFound(msg) if msg.is_empty() => fallback.to_string(),
        ClientError::Server { .. } | ClientError::Decode(_) | ClientError::Storage(_) => {
            error!("échec de l'appel distant: {err}");
            fallback.to_string()
        }
        other => {
            warn!("échec de l'appel distant: {other}");
            other.user_message()
        }
    }
}
