use std::sync::Arc;

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::auth::AuthState;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::{CatalogSource, HttpCatalog, HttpMembershipRemote, ProfileGateway};
use crate::helpers::ApiResult;
use crate::list::PokemonList;
use crate::membership::{CollectionKind, MembershipCollection};
use crate::models::UserProfile;
use crate::store::{FileStore, KeyValueStore, MemoryStore};

/// Tous les composants du client, partageant un seul transport HTTP et une
/// seule session.
pub struct Pokedex {
    config: ClientConfig,
    auth: Arc<AuthState>,
    catalog: Arc<dyn CatalogSource>,
    profile: ProfileGateway,
    favorites: Arc<MembershipCollection>,
    team: Arc<MembershipCollection>,
    list: Arc<PokemonList>,
}

impl Pokedex {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.store_path {
            Some(path) => Arc::new(FileStore::open(path)),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store)
    }

    pub fn with_store(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> ApiResult<Self> {
        let api = ApiClient::new(&config)?;
        let auth = Arc::new(AuthState::new(api.clone(), store));
        let catalog: Arc<dyn CatalogSource> = Arc::new(HttpCatalog::new(api.clone()));

        let collection = |kind| {
            Arc::new(MembershipCollection::new(
                kind,
                Arc::new(HttpMembershipRemote::new(api.clone(), auth.clone(), kind)),
            ))
        };
        let favorites = collection(CollectionKind::Favorites);
        let team = collection(CollectionKind::Team);

        let list = Arc::new(PokemonList::new(
            catalog.clone(),
            favorites.clone(),
            team.clone(),
        ));
        let profile = ProfileGateway::new(api, auth.clone());

        Ok(Self {
            config,
            auth,
            catalog,
            profile,
            favorites,
            team,
            list,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn catalog(&self) -> &dyn CatalogSource {
        self.catalog.as_ref()
    }

    pub fn profile(&self) -> &ProfileGateway {
        &self.profile
    }

    pub fn favorites(&self) -> &MembershipCollection {
        &self.favorites
    }

    pub fn team(&self) -> &MembershipCollection {
        &self.team
    }

    pub fn list(&self) -> &PokemonList {
        &self.list
    }

    /// Connexion suivie du chargement des collections de l'utilisateur.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<UserProfile> {
        let user = self.auth.login(email, password).await?;
        self.sync_collections().await;
        Ok(user)
    }

    /// Recharge favoris et équipe si une session existe. Les échecs sont journalisés.
    pub async fn sync_collections(&self) {
        if !self.auth.is_logged_in() {
            return;
        }
        let (favorites, team) = tokio::join!(self.favorites.load(), self.team.load());
        for (kind, res) in [(CollectionKind::Favorites, favorites), (CollectionKind::Team, team)] {
            match res {
                Ok(count) => info!(kind = kind.label(), count, "collection chargée"),
                Err(err) => {
                    warn!(kind = kind.label(), "collection non chargée: {err}");
                    self.expire_if_unauthorized(&err);
                }
            }
        }
    }

    /// Ferme la session et vide tout l'état dérivé de l'utilisateur.
    pub fn logout(&self) {
        self.auth.logout();
        self.favorites.clear();
        self.team.clear();
        self.list.reset();
        info!("session fermée");
    }

    /// Un 401 sur une session existante signifie un jeton expiré.
    pub fn expire_if_unauthorized(&self, err: &ClientError) -> bool {
        if err.is_auth() && self.auth.is_logged_in() {
            warn!("jeton refusé par le serveur, session effacée");
            self.logout();
            return true;
        }
        false
    }
}
