//! Collections de l'utilisateur (favoris, équipe) mises en miroir localement.
//!
//! Les mutations sont optimistes : l'instantané local change avant l'appel
//! distant, puis est restauré par compare-and-swap si le serveur refuse. Si la
//! collection a bougé entre-temps, seule notre propre mutation est annulée.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::gateway::MembershipRemote;
use crate::helpers::{ApiResult, is_capacity_message};
use crate::models::PokemonSummary;

pub const TEAM_CAPACITY: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Favorites,
    Team,
}

impl CollectionKind {
    pub fn path(self) -> &'static str {
        match self {
            CollectionKind::Favorites => "/api/favorites/",
            CollectionKind::Team => "/api/equipe/",
        }
    }

    pub fn capacity(self) -> Option<usize> {
        match self {
            CollectionKind::Favorites => None,
            CollectionKind::Team => Some(TEAM_CAPACITY),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Favorites => "favoris",
            CollectionKind::Team => "équipe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

/// Instantané immuable : ordre du serveur, ids uniques.
#[derive(Debug, Default)]
struct Members {
    items: Vec<PokemonSummary>,
    ids: HashSet<u32>,
}

impl Members {
    fn from_items(items: Vec<PokemonSummary>) -> Self {
        let mut members = Members::default();
        for item in items {
            if members.ids.insert(item.id) {
                members.items.push(item);
            }
        }
        members
    }

    fn with(&self, item: PokemonSummary) -> Self {
        let mut items = self.items.clone();
        let mut ids = self.ids.clone();
        if ids.insert(item.id) {
            items.push(item);
        }
        Members { items, ids }
    }

    fn without(&self, id: u32) -> Self {
        Members {
            items: self.items.iter().filter(|p| p.id != id).cloned().collect(),
            ids: self.ids.iter().copied().filter(|i| *i != id).collect(),
        }
    }

    fn restored(&self, index: usize, item: &PokemonSummary) -> Self {
        if self.ids.contains(&item.id) {
            return Members {
                items: self.items.clone(),
                ids: self.ids.clone(),
            };
        }
        let mut items = self.items.clone();
        items.insert(index.min(items.len()), item.clone());
        let mut ids = self.ids.clone();
        ids.insert(item.id);
        Members { items, ids }
    }

    fn position(&self, id: u32) -> Option<(usize, &PokemonSummary)> {
        if !self.ids.contains(&id) {
            return None;
        }
        self.items.iter().enumerate().find(|(_, p)| p.id == id)
    }
}

pub struct MembershipCollection {
    kind: CollectionKind,
    remote: Arc<dyn MembershipRemote>,
    members: ArcSwap<Members>,
    state: Mutex<LoadState>,
    // Incrémenté à chaque chargement et à chaque `clear` : seul le dernier chargement s'applique.
    epoch: AtomicU64,
    // Incrémenté par `clear` : une annulation d'une session close est abandonnée.
    session: AtomicU64,
}

impl MembershipCollection {
    pub fn new(kind: CollectionKind, remote: Arc<dyn MembershipRemote>) -> Self {
        Self {
            kind,
            remote,
            members: ArcSwap::from_pointee(Members::default()),
            state: Mutex::new(LoadState::Uninitialized),
            epoch: AtomicU64::new(0),
            session: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn state(&self) -> LoadState {
        *self.state.lock()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.members.load().ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.load().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<PokemonSummary> {
        self.members.load().items.clone()
    }

    /// Recharge toute la collection depuis le serveur et remplace l'état local.
    pub async fn load(&self) -> ApiResult<usize> {
        let (ticket, previous) = {
            let mut state = self.state.lock();
            let ticket = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            (ticket, std::mem::replace(&mut *state, LoadState::Loading))
        };

        let fetched = self.remote.fetch_all().await;

        let mut state = self.state.lock();
        if self.epoch.load(Ordering::SeqCst) != ticket {
            debug!(kind = self.kind.label(), "chargement dépassé, ignoré");
            return fetched.map(|_| self.members.load().items.len());
        }
        match fetched {
            Ok(items) => {
                let members = Members::from_items(items);
                let count = members.items.len();
                self.members.store(Arc::new(members));
                *state = LoadState::Ready;
                debug!(kind = self.kind.label(), count, "collection chargée");
                Ok(count)
            }
            Err(err) => {
                *state = previous;
                warn!(kind = self.kind.label(), "chargement impossible: {err}");
                Err(err)
            }
        }
    }

    /// Ajout optimiste. `Ok(false)` si l'id est déjà présent (aucun appel).
    pub async fn add(&self, item: PokemonSummary) -> ApiResult<bool> {
        let id = item.id;
        let (before, after, session) = loop {
            let session = self.session.load(Ordering::SeqCst);
            let current = self.members.load_full();
            if current.ids.contains(&id) {
                return Ok(false);
            }
            if let Some(cap) = self.kind.capacity()
                && current.items.len() >= cap
            {
                return Err(ClientError::Capacity(format!(
                    "{} déjà complète ({cap} Pokémon).",
                    self.kind.label()
                )));
            }
            let next = Arc::new(current.with(item.clone()));
            let prev = self.members.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&*prev, &current) {
                break (current, next, session);
            }
        };

        match self.remote.create(&item).await {
            Ok(()) => {
                info!(kind = self.kind.label(), id, name = %item.name, "ajouté");
                Ok(true)
            }
            Err(err) => {
                let err = self.classify(err);
                self.rollback(session, &before, &after, |m| m.without(id));
                warn!(kind = self.kind.label(), id, "ajout refusé, annulé: {err}");
                Err(err)
            }
        }
    }

    /// Retrait optimiste. `Ok(false)` si l'id est absent (aucun appel).
    pub async fn remove(&self, id: u32) -> ApiResult<bool> {
        let (before, after, index, item, session) = loop {
            let session = self.session.load(Ordering::SeqCst);
            let current = self.members.load_full();
            let Some((index, item)) = current.position(id).map(|(i, p)| (i, p.clone())) else {
                return Ok(false);
            };
            let next = Arc::new(current.without(id));
            let prev = self.members.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&*prev, &current) {
                break (current, next, index, item, session);
            }
        };

        match self.remote.delete(id).await {
            Ok(()) => {
                info!(kind = self.kind.label(), id, "retiré");
                Ok(true)
            }
            // Déjà absent côté serveur : l'état local est juste.
            Err(ClientError::NotFound(_)) => {
                debug!(kind = self.kind.label(), id, "déjà absent côté serveur");
                Ok(true)
            }
            Err(err) => {
                self.rollback(session, &before, &after, |m| m.restored(index, &item));
                warn!(kind = self.kind.label(), id, "retrait refusé, restauré: {err}");
                Err(err)
            }
        }
    }

    /// `contains ? remove : add`. Renvoie l'appartenance après l'appel.
    pub async fn toggle(&self, item: &PokemonSummary) -> ApiResult<bool> {
        if self.contains(item.id) {
            self.remove(item.id).await.map(|_| false)
        } else {
            self.add(item.clone()).await.map(|_| true)
        }
    }

    /// Vide la collection (déconnexion) et invalide les chargements en cours.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.session.fetch_add(1, Ordering::SeqCst);
        self.members.store(Arc::new(Members::default()));
        *state = LoadState::Uninitialized;
    }

    fn classify(&self, err: ClientError) -> ClientError {
        match err {
            ClientError::Server { status: 400, message }
                if self.kind.capacity().is_some() && is_capacity_message(&message) =>
            {
                ClientError::Capacity(message)
            }
            other => other,
        }
    }

    fn rollback(
        &self,
        session: u64,
        before: &Arc<Members>,
        after: &Arc<Members>,
        undo: impl Fn(&Members) -> Members,
    ) {
        if self.session.load(Ordering::SeqCst) != session {
            debug!(kind = self.kind.label(), "collection vidée entre-temps, annulation ignorée");
            return;
        }
        let restored = Arc::ptr_eq(
            &*self.members.compare_and_swap(after, Arc::clone(before)),
            after,
        );
        if !restored {
            self.members.rcu(|current| undo(&**current));
        }
    }
}
