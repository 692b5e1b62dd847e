use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use pokedex_rncp_client::Pokedex;
use pokedex_rncp_client::config::ClientConfig;
use pokedex_rncp_client::store::{KeyValueStore, MemoryStore};

pub const ASH_EMAIL: &str = "ash@pokedex.test";
pub const ASH_PASSWORD: &str = "pikachu123";
pub const OAK_EMAIL: &str = "oak@pokedex.test";
pub const OAK_PASSWORD: &str = "professeur";
pub const TEAM_FULL_MSG: &str =
    "Você já possui 6 Pokémon na sua equipe. Remova um antes de adicionar outro.";

const GENERATIONS: [(u32, u32); 8] = [
    (1, 151),
    (152, 251),
    (252, 386),
    (387, 493),
    (494, 649),
    (650, 721),
    (722, 809),
    (810, 905),
];

type Reply = (StatusCode, Json<Value>);

#[derive(Clone)]
pub struct FakeUser {
    pub id: u64,
    pub name: String,
    pub nickname: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

impl FakeUser {
    fn json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "nickname": self.nickname,
            "email": self.email,
            "is_admin": self.is_admin,
        })
    }
}

/// API factice en mémoire ; jetons de la forme `token-{id}`.
#[derive(Default)]
pub struct Backend {
    pub users: Mutex<Vec<FakeUser>>,
    pub favorites: Mutex<HashMap<u64, Vec<Value>>>,
    pub team: Mutex<HashMap<u64, Vec<Value>>>,
    pub catalog_down: AtomicBool,
    pub catalog_hits: AtomicUsize,
}

pub type Shared = Arc<Backend>;

impl Backend {
    fn seeded() -> Self {
        let backend = Self::default();
        *backend.users.lock() = vec![
            FakeUser {
                id: 1,
                name: "Ash Ketchum".into(),
                nickname: "ash".into(),
                email: ASH_EMAIL.into(),
                password: ASH_PASSWORD.into(),
                is_admin: false,
            },
            FakeUser {
                id: 2,
                name: "Samuel Chen".into(),
                nickname: "oak".into(),
                email: OAK_EMAIL.into(),
                password: OAK_PASSWORD.into(),
                is_admin: true,
            },
        ];
        backend
    }

    fn user_from(&self, headers: &HeaderMap) -> Option<FakeUser> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let id: u64 = value.strip_prefix("Bearer token-")?.parse().ok()?;
        self.users.lock().iter().find(|u| u.id == id).cloned()
    }

    #[allow(dead_code)]
    pub fn seed_team(&self, user_id: u64, ids: impl IntoIterator<Item = u32>) {
        self.team
            .lock()
            .insert(user_id, ids.into_iter().map(summary).collect());
    }

    #[allow(dead_code)]
    pub fn team_ids(&self, user_id: u64) -> Vec<u64> {
        ids_in(&self.team, user_id)
    }

    #[allow(dead_code)]
    pub fn favorite_ids(&self, user_id: u64) -> Vec<u64> {
        ids_in(&self.favorites, user_id)
    }
}

fn ids_in(store: &Mutex<HashMap<u64, Vec<Value>>>, user_id: u64) -> Vec<u64> {
    store
        .lock()
        .get(&user_id)
        .map(|items| items.iter().filter_map(|i| i["id"].as_u64()).collect())
        .unwrap_or_default()
}

fn name_of(id: u32) -> String {
    match id {
        1 => "Bulbasaur".into(),
        4 => "Charmander".into(),
        7 => "Squirtle".into(),
        25 => "Pikachu".into(),
        _ => format!("Pokemon{id}"),
    }
}

fn type_of(id: u32) -> &'static str {
    match id {
        1 => "grass",
        4 => "fire",
        7 => "water",
        25 => "electric",
        _ => "normal",
    }
}

fn summary(id: u32) -> Value {
    json!({
        "id": id,
        "name": name_of(id),
        "types": [type_of(id)],
        "sprite_url": format!("https://sprites.test/{id}.png"),
    })
}

fn details(id: u32) -> Value {
    let mut value = summary(id);
    value["height"] = json!(4);
    value["weight"] = json!(60);
    value["abilities"] = json!([
        { "name": "static", "is_hidden": false },
        { "name": "lightning-rod", "is_hidden": true },
    ]);
    value["stats"] = json!({
        "hp": 35, "attack": 55, "defense": 40,
        "special-attack": 50, "special-defense": 50, "speed": 90,
    });
    value
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn unauthorized() -> Reply {
    reply(
        StatusCode::UNAUTHORIZED,
        json!({ "msg": "Missing Authorization Header" }),
    )
}

async fn health() -> &'static str {
    "ok"
}

async fn login(State(b): State<Shared>, Json(body): Json<Value>) -> Reply {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let found = b
        .users
        .lock()
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned();
    match found {
        Some(user) => reply(
            StatusCode::OK,
            json!({
                "msg": "Login realizado com sucesso!",
                "access_token": format!("token-{}", user.id),
                "user": user.json(),
            }),
        ),
        None => reply(
            StatusCode::UNAUTHORIZED,
            json!({ "msg": "Email ou senha inválidos" }),
        ),
    }
}

async fn register(State(b): State<Shared>, Json(body): Json<Value>) -> Reply {
    let field = |k: &str| body[k].as_str().unwrap_or_default().to_string();
    let (name, nickname, email, password) = (
        field("name"),
        field("nickname"),
        field("email"),
        field("password"),
    );
    if [&name, &nickname, &email, &password].iter().any(|f| f.is_empty()) {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "msg": "Todos os campos são obrigatórios" }),
        );
    }
    let mut users = b.users.lock();
    if users.iter().any(|u| u.email == email) {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "msg": "Email já cadastrado" }),
        );
    }
    let id = users.len() as u64 + 1;
    users.push(FakeUser {
        id,
        name,
        nickname,
        email,
        password,
        is_admin: false,
    });
    reply(
        StatusCode::CREATED,
        json!({ "msg": "Usuário cadastrado com sucesso!" }),
    )
}

async fn filter(State(b): State<Shared>, Query(q): Query<HashMap<String, String>>) -> Reply {
    b.catalog_hits.fetch_add(1, Ordering::SeqCst);
    if b.catalog_down.load(Ordering::SeqCst) {
        return reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "msg": "Erro ao buscar Pokémons." }),
        );
    }
    let range = match q.get("generation").map(|g| g.parse::<usize>()) {
        Some(Ok(g)) if (1..=8).contains(&g) => GENERATIONS[g - 1],
        Some(_) => {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({ "msg": "Geração inválida" }),
            );
        }
        None => (1, 905),
    };
    let wanted = q.get("type").map(|t| t.to_lowercase());
    let results: Vec<Value> = (range.0..=range.1)
        .filter(|id| wanted.as_deref().is_none_or(|t| t == type_of(*id)))
        .map(summary)
        .collect();
    reply(
        StatusCode::OK,
        json!({ "count": results.len(), "results": results }),
    )
}

async fn search(State(b): State<Shared>, Path(term): Path<String>) -> Reply {
    b.catalog_hits.fetch_add(1, Ordering::SeqCst);
    let term = term.to_lowercase();
    let found = match term.parse::<u32>() {
        Ok(id) => (1..=905).contains(&id).then_some(id),
        Err(_) => (1..=905).find(|id| name_of(*id).to_lowercase() == term),
    };
    match found {
        Some(id) => reply(StatusCode::OK, details(id)),
        None => reply(StatusCode::NOT_FOUND, json!({ "msg": "not found" })),
    }
}

fn list_of(b: &Backend, store: &Mutex<HashMap<u64, Vec<Value>>>, headers: &HeaderMap) -> Reply {
    let Some(user) = b.user_from(headers) else {
        return unauthorized();
    };
    let items = store.lock().get(&user.id).cloned().unwrap_or_default();
    reply(StatusCode::OK, Value::Array(items))
}

fn add_to(
    b: &Backend,
    store: &Mutex<HashMap<u64, Vec<Value>>>,
    capacity: Option<usize>,
    headers: &HeaderMap,
    body: Value,
) -> Reply {
    let Some(user) = b.user_from(headers) else {
        return unauthorized();
    };
    let (Some(id), Some(name)) = (body["pokemon_id"].as_u64(), body["pokemon_name"].as_str())
    else {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "msg": "Nome e ID do Pokémon são obrigatórios" }),
        );
    };
    let mut store = store.lock();
    let items = store.entry(user.id).or_default();
    if items.iter().any(|i| i["id"].as_u64() == Some(id)) {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "msg": "Pokémon já está na lista" }),
        );
    }
    if capacity.is_some_and(|c| items.len() >= c) {
        return reply(StatusCode::BAD_REQUEST, json!({ "msg": TEAM_FULL_MSG }));
    }
    items.push(json!({
        "id": id,
        "name": name,
        "sprite_url": body["pokemon_image"],
        "height": body["height"],
        "weight": body["weight"],
        "abilities": body["abilities"],
        "stats": body["stats"],
        "types": body["types"],
    }));
    reply(
        StatusCode::CREATED,
        json!({ "msg": format!("{name} adicionado!") }),
    )
}

fn remove_from(
    b: &Backend,
    store: &Mutex<HashMap<u64, Vec<Value>>>,
    headers: &HeaderMap,
    id: u64,
) -> Reply {
    let Some(user) = b.user_from(headers) else {
        return unauthorized();
    };
    let mut store = store.lock();
    let items = store.entry(user.id).or_default();
    match items.iter().position(|i| i["id"].as_u64() == Some(id)) {
        Some(index) => {
            items.remove(index);
            reply(StatusCode::OK, json!({ "msg": "Pokémon removido!" }))
        }
        None => reply(
            StatusCode::NOT_FOUND,
            json!({ "msg": "Pokémon não encontrado" }),
        ),
    }
}

async fn list_favorites(State(b): State<Shared>, headers: HeaderMap) -> Reply {
    list_of(&b, &b.favorites, &headers)
}

async fn add_favorite(State(b): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    add_to(&b, &b.favorites, None, &headers, body)
}

async fn remove_favorite(State(b): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Reply {
    remove_from(&b, &b.favorites, &headers, id)
}

async fn list_team(State(b): State<Shared>, headers: HeaderMap) -> Reply {
    list_of(&b, &b.team, &headers)
}

async fn add_team(State(b): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    add_to(&b, &b.team, Some(6), &headers, body)
}

async fn remove_team(State(b): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Reply {
    remove_from(&b, &b.team, &headers, id)
}

async fn get_profile(State(b): State<Shared>, headers: HeaderMap) -> Reply {
    match b.user_from(&headers) {
        Some(user) => reply(StatusCode::OK, user.json()),
        None => unauthorized(),
    }
}

async fn update_profile(
    State(b): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let Some(user) = b.user_from(&headers) else {
        return unauthorized();
    };
    let mut users = b.users.lock();
    let Some(stored) = users.iter_mut().find(|u| u.id == user.id) else {
        return unauthorized();
    };
    if let Some(name) = body["name"].as_str().filter(|s| !s.is_empty()) {
        stored.name = name.into();
    }
    if let Some(nickname) = body["nickname"].as_str().filter(|s| !s.is_empty()) {
        stored.nickname = nickname.into();
    }
    if let Some(password) = body["password"].as_str().filter(|s| !s.is_empty()) {
        stored.password = password.into();
    }
    reply(
        StatusCode::OK,
        json!({ "msg": "Perfil atualizado com sucesso!", "user": stored.json() }),
    )
}

async fn list_users(State(b): State<Shared>, headers: HeaderMap) -> Reply {
    let Some(user) = b.user_from(&headers) else {
        return unauthorized();
    };
    if !user.is_admin {
        return reply(StatusCode::FORBIDDEN, json!({ "error": "Acesso negado" }));
    }
    let users: Vec<Value> = b.users.lock().iter().map(FakeUser::json).collect();
    reply(StatusCode::OK, Value::Array(users))
}

fn build_routes() -> Router<Shared> {
    Router::new()
        .route("/api", get(health))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/pokemon/filter", get(filter))
        .route("/pokemon/search/{term}", get(search))
        .route("/api/favorites/", get(list_favorites).post(add_favorite))
        .route("/api/favorites/{id}", delete(remove_favorite))
        .route("/api/equipe/", get(list_team).post(add_team))
        .route("/api/equipe/{id}", delete(remove_team))
        .route("/api/profile/", get(get_profile).put(update_profile))
        .route("/api/users", get(list_users))
}

pub async fn start_server() -> (String, tokio::task::JoinHandle<()>, Shared) {
    let backend: Shared = Arc::new(Backend::seeded());
    let app = build_routes().with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("serve error: {e}");
        }
    });

    for _ in 0..30 {
        if let Ok(resp) = reqwest::get(format!("{url}/api")).await
            && resp.status().is_success()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    (url, handle, backend)
}

#[allow(dead_code)]
pub fn client(base: &str) -> Pokedex {
    client_with_store(base, Arc::new(MemoryStore::new()))
}

#[allow(dead_code)]
pub fn client_with_store(base: &str, store: Arc<dyn KeyValueStore>) -> Pokedex {
    Pokedex::with_store(ClientConfig::in_memory(base), store).unwrap()
}

#[allow(dead_code)]
pub async fn logged_in(base: &str, email: &str, password: &str) -> Pokedex {
    let pokedex = client(base);
    pokedex.login(email, password).await.expect("login failed");
    pokedex
}
