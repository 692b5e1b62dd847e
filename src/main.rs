use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokedex_rncp_client::Pokedex;
use pokedex_rncp_client::config::ClientConfig;
use pokedex_rncp_client::gateway::CatalogSource;
use pokedex_rncp_client::list::{Category, FilterState, ListEntry};
use pokedex_rncp_client::membership::CollectionKind;
use pokedex_rncp_client::models::{
    Generation, PokemonSummary, PokemonType, RegisterUser, UpdateProfile,
};

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(author, version, about = "Pokédex en ligne de commande", long_about = None)]
struct Cli {
    /// URL de l'API
    #[arg(long, env = "POKEDEX_API_URL")]
    api_url: Option<String>,

    /// Fichier de session
    #[arg(long, env = "POKEDEX_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Liste filtrée ; sans critère, la génération 1.
    List {
        #[arg(short, long)]
        generation: Option<Generation>,
        #[arg(short = 't', long = "type")]
        pokemon_type: Option<PokemonType>,
        #[arg(short, long, default_value = "all")]
        category: Category,
    },
    Search {
        term: String,
    },
    Show {
        id: u32,
    },
    /// Ajoute ou retire des favoris (nom ou numéro).
    Favorite {
        term: String,
    },
    /// Ajoute ou retire de l'équipe (6 maximum).
    Team {
        term: String,
    },
    /// Affiche le profil, ou le modifie si une option est donnée.
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Users,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(path) = cli.store {
        config.store_path = Some(path);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let pokedex = Pokedex::new(config)?;
    run(&pokedex, cli.command).await;
    Ok(())
}

async fn run(pokedex: &Pokedex, command: Command) {
    match command {
        Command::Login { email, password } => match pokedex.login(&email, &password).await {
            Ok(user) => println!("Bienvenue, {} !", user.display_name()),
            Err(err) => println!("{}", err.user_message()),
        },
        Command::Logout => {
            pokedex.logout();
            println!("Déconnecté.");
        }
        Command::Whoami => match pokedex.auth().current_user() {
            Some(user) => {
                let role = if user.is_admin() { " (admin)" } else { "" };
                println!("{} <{}>{role}", user.display_name(), user.email);
            }
            None => println!("Aucune session."),
        },
        Command::Register {
            name,
            nickname,
            email,
            password,
            confirm,
        } => {
            let payload = RegisterUser {
                name,
                nickname,
                email,
                password,
                confirm_password: confirm,
            };
            match pokedex.auth().register(&payload).await {
                Ok(msg) => println!("{msg}"),
                Err(err) => println!("{}", err.user_message()),
            }
        }
        Command::List {
            generation,
            pokemon_type,
            category,
        } => {
            pokedex.sync_collections().await;
            pokedex
                .list()
                .set_filters(FilterState {
                    generation,
                    pokemon_type,
                    search_term: String::new(),
                    category,
                })
                .await;
            print_page(pokedex);
        }
        Command::Search { term } => {
            pokedex.sync_collections().await;
            pokedex.list().search(&term).await;
            print_page(pokedex);
        }
        Command::Show { id } => match pokedex.list().view_details(id).await {
            Some(pokemon) => print_details(&pokemon),
            None => println!("{}", pokedex.list().message()),
        },
        Command::Favorite { term } => toggle(pokedex, &term, CollectionKind::Favorites).await,
        Command::Team { term } => toggle(pokedex, &term, CollectionKind::Team).await,
        Command::Profile {
            name,
            nickname,
            password,
        } => {
            let update = UpdateProfile {
                name,
                nickname,
                password,
            };
            let res = if update.is_empty() {
                pokedex.profile().get_profile().await.map(|user| {
                    format!(
                        "{} ({}) <{}>",
                        user.name,
                        user.display_name(),
                        user.email
                    )
                })
            } else {
                pokedex.profile().update_profile(&update).await
            };
            match res {
                Ok(line) => println!("{line}"),
                Err(err) => {
                    pokedex.expire_if_unauthorized(&err);
                    println!("{}", err.user_message());
                }
            }
        }
        Command::Users => match pokedex.profile().list_users().await {
            Ok(users) => {
                for user in users {
                    let role = if user.is_admin() { "admin" } else { "membre" };
                    println!("{:<24} {:<32} {role}", user.display_name(), user.email);
                }
            }
            Err(err) => {
                pokedex.expire_if_unauthorized(&err);
                println!("{}", err.user_message());
            }
        },
    }
}

async fn toggle(pokedex: &Pokedex, term: &str, kind: CollectionKind) {
    let pokemon = match pokedex.catalog().search_by_term(term).await {
        Ok(pokemon) => pokemon,
        Err(err) => {
            println!("{}", err.user_message());
            return;
        }
    };
    pokedex.sync_collections().await;
    let res = match kind {
        CollectionKind::Team => pokedex.list().toggle_team(&pokemon).await,
        CollectionKind::Favorites => pokedex.list().toggle_favorite(&pokemon).await,
    };
    if let Err(err) = &res {
        pokedex.expire_if_unauthorized(err);
    }
    println!("{}", pokedex.list().message());
}

fn print_page(pokedex: &Pokedex) {
    let list = pokedex.list();
    let page = list.page();
    if !page.message.is_empty() {
        println!("{}", page.message);
    }
    for entry in list.entries() {
        println!("{}", entry_line(&entry));
    }
    println!("{} Pokémon", page.count);
}

fn entry_line(entry: &ListEntry) -> String {
    let p = &entry.pokemon;
    let types: Vec<&str> = p.types.iter().map(|t| t.as_str()).collect();
    let mut line = format!("#{:03} {:<14} {}", p.id, p.name, types.join("/"));
    if entry.in_team {
        line.push_str(" [équipe]");
    }
    if entry.favorite {
        line.push_str(" [favori]");
    }
    line
}

fn print_details(p: &PokemonSummary) {
    let types: Vec<&str> = p.types.iter().map(|t| t.as_str()).collect();
    println!("#{:03} {} ({})", p.id, p.name, types.join("/"));
    println!("Taille {} m, poids {} kg", p.height, p.weight);
    for ability in &p.abilities {
        let hidden = if ability.is_hidden { " (cachée)" } else { "" };
        println!("  talent: {}{hidden}", ability.name);
    }
    let s = &p.stats;
    println!(
        "PV {} / Att {} / Déf {} / Att.Spé {} / Déf.Spé {} / Vit {} (total {})",
        s.hp,
        s.attack,
        s.defense,
        s.special_attack,
        s.special_defense,
        s.speed,
        s.total()
    );
    if !p.sprite_url.is_empty() {
        println!("{}", p.sprite_url);
    }
}
