use pokedex_rncp_client::error::CAPACITY_MESSAGE;
use pokedex_rncp_client::gateway::CatalogSource;
use pokedex_rncp_client::membership::TEAM_CAPACITY;
use pokedex_rncp_client::models::PokemonSummary;
use pokedex_rncp_client::{ClientError, Pokedex};

mod common;
use common::{ASH_EMAIL, ASH_PASSWORD, client, logged_in, start_server};

async fn fiche(pokedex: &Pokedex, term: &str) -> PokemonSummary {
    pokedex.catalog().search_by_term(term).await.unwrap()
}

#[tokio::test]
async fn equipe_pleine_rejet_local() {
    let (base, handle, backend) = start_server().await;
    backend.seed_team(1, 1..=6);
    let pokedex = logged_in(&base, ASH_EMAIL, ASH_PASSWORD).await;
    assert_eq!(pokedex.team().len(), TEAM_CAPACITY);

    let pikachu = fiche(&pokedex, "pikachu").await;
    let err = pokedex.team().add(pikachu).await.unwrap_err();
    assert!(err.is_capacity());
    assert_eq!(err.user_message(), CAPACITY_MESSAGE);
    assert_eq!(pokedex.team().len(), TEAM_CAPACITY);
    assert_eq!(backend.team_ids(1).len(), TEAM_CAPACITY);

    handle.abort();
}

#[tokio::test]
async fn equipe_pleine_cote_serveur() {
    let (base, handle, backend) = start_server().await;
    let pokedex = logged_in(&base, ASH_EMAIL, ASH_PASSWORD).await;
    assert!(pokedex.team().is_empty());

    // Le miroir local est en retard sur le serveur.
    backend.seed_team(1, 1..=6);
    let pikachu = fiche(&pokedex, "pikachu").await;
    let err = pokedex.list().toggle_team(&pikachu).await.unwrap_err();
    assert!(matches!(err, ClientError::Capacity(_)));
    assert!(pokedex.team().is_empty());
    assert!(!pokedex.team().contains(25));
    assert_eq!(pokedex.list().page().message, CAPACITY_MESSAGE);

    pokedex.team().load().await.unwrap();
    assert_eq!(pokedex.team().len(), TEAM_CAPACITY);

    handle.abort();
}

#[tokio::test]
async fn favori_bascule_aller_retour() {
    let (base, handle, backend) = start_server().await;
    let pokedex = logged_in(&base, ASH_EMAIL, ASH_PASSWORD).await;
    let pikachu = fiche(&pokedex, "pikachu").await;

    assert!(pokedex.favorites().toggle(&pikachu).await.unwrap());
    assert!(pokedex.favorites().contains(25));
    assert_eq!(backend.favorite_ids(1), vec![25]);

    // Le serveur renvoie la fiche complète au rechargement.
    pokedex.favorites().load().await.unwrap();
    assert_eq!(pokedex.favorites().snapshot(), vec![pikachu.clone()]);

    assert!(!pokedex.favorites().toggle(&pikachu).await.unwrap());
    assert!(!pokedex.favorites().contains(25));
    assert!(backend.favorite_ids(1).is_empty());

    handle.abort();
}

#[tokio::test]
async fn retrait_deja_absent_cote_serveur() {
    let (base, handle, backend) = start_server().await;
    let pokedex = logged_in(&base, ASH_EMAIL, ASH_PASSWORD).await;
    let bulbasaur = fiche(&pokedex, "bulbasaur").await;
    pokedex.team().add(bulbasaur).await.unwrap();

    backend.team.lock().clear();
    assert!(pokedex.team().remove(1).await.unwrap());
    assert!(pokedex.team().is_empty());

    handle.abort();
}

#[tokio::test]
async fn sans_session_aucune_modification() {
    let (base, handle, backend) = start_server().await;
    let pokedex = client(&base);
    let pikachu = fiche(&pokedex, "pikachu").await;

    let err = pokedex.team().add(pikachu).await.unwrap_err();
    assert!(err.is_auth());
    assert!(pokedex.team().is_empty());
    assert!(backend.team_ids(1).is_empty());

    handle.abort();
}

#[tokio::test]
async fn equipe_puis_favoris_en_tete() {
    let (base, handle, backend) = start_server().await;
    backend.seed_team(1, [25]);
    let pokedex = logged_in(&base, ASH_EMAIL, ASH_PASSWORD).await;
    let charmander = fiche(&pokedex, "charmander").await;
    pokedex.favorites().add(charmander).await.unwrap();

    pokedex.list().initialize().await;
    let entries = pokedex.list().entries();
    let head: Vec<(u32, bool, bool)> = entries
        .iter()
        .take(4)
        .map(|e| (e.pokemon.id, e.in_team, e.favorite))
        .collect();
    assert_eq!(
        head,
        vec![
            (25, true, false),
            (4, false, true),
            (1, false, false),
            (2, false, false)
        ]
    );
    assert_eq!(entries.len(), 151);

    handle.abort();
}
