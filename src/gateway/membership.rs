use std::sync::Arc;

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::auth::AuthState;
use crate::helpers::ApiResult;
use crate::membership::CollectionKind;
use crate::models::{ApiMessage, MembershipPayload, PokemonSummary};

/// Côté serveur d'une collection de l'utilisateur (favoris ou équipe).
#[async_trait]
pub trait MembershipRemote: Send + Sync {
    async fn fetch_all(&self) -> ApiResult<Vec<PokemonSummary>>;
    async fn create(&self, item: &PokemonSummary) -> ApiResult<()>;
    async fn delete(&self, id: u32) -> ApiResult<()>;
}

/// Chaque appel lit le jeton courant : sans session, échec `Auth` sans requête.
pub struct HttpMembershipRemote {
    api: ApiClient,
    auth: Arc<AuthState>,
    kind: CollectionKind,
}

impl HttpMembershipRemote {
    pub fn new(api: ApiClient, auth: Arc<AuthState>, kind: CollectionKind) -> Self {
        Self { api, auth, kind }
    }
}

#[async_trait]
impl MembershipRemote for HttpMembershipRemote {
    async fn fetch_all(&self) -> ApiResult<Vec<PokemonSummary>> {
        let header = self.auth.require_header()?;
        self.api.get(self.kind.path(), Some(&header)).await
    }

    async fn create(&self, item: &PokemonSummary) -> ApiResult<()> {
        let header = self.auth.require_header()?;
        let payload = MembershipPayload::from(item);
        let _: Option<ApiMessage> = self
            .api
            .post(self.kind.path(), &payload, Some(&header))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: u32) -> ApiResult<()> {
        let header = self.auth.require_header()?;
        let path = format!("{}{id}", self.kind.path());
        let _: Option<ApiMessage> = self.api.delete(&path, Some(&header)).await?;
        Ok(())
    }
}
