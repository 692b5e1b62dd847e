use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Steel,
    Dark,
    Fairy,
}

impl PokemonType {
    pub const ALL: [PokemonType; 18] = [
        PokemonType::Normal,
        PokemonType::Fire,
        PokemonType::Water,
        PokemonType::Grass,
        PokemonType::Electric,
        PokemonType::Ice,
        PokemonType::Fighting,
        PokemonType::Poison,
        PokemonType::Ground,
        PokemonType::Flying,
        PokemonType::Psychic,
        PokemonType::Bug,
        PokemonType::Rock,
        PokemonType::Ghost,
        PokemonType::Dragon,
        PokemonType::Steel,
        PokemonType::Dark,
        PokemonType::Fairy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PokemonType::Normal => "Normal",
            PokemonType::Fire => "Fire",
            PokemonType::Water => "Water",
            PokemonType::Grass => "Grass",
            PokemonType::Electric => "Electric",
            PokemonType::Ice => "Ice",
            PokemonType::Fighting => "Fighting",
            PokemonType::Poison => "Poison",
            PokemonType::Ground => "Ground",
            PokemonType::Flying => "Flying",
            PokemonType::Psychic => "Psychic",
            PokemonType::Bug => "Bug",
            PokemonType::Rock => "Rock",
            PokemonType::Ghost => "Ghost",
            PokemonType::Dragon => "Dragon",
            PokemonType::Steel => "Steel",
            PokemonType::Dark => "Dark",
            PokemonType::Fairy => "Fairy",
        }
    }

    /// Forme attendue par `GET /pokemon/filter?type=`.
    pub fn query_value(self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PokemonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PokemonType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("type inconnu: {wanted}"))
    }
}

impl TryFrom<String> for PokemonType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PokemonType> for String {
    fn from(value: PokemonType) -> Self {
        value.as_str().to_string()
    }
}

/// Génération (ère de sortie) ; seules 1 à 8 sont proposées au filtre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u8);

impl Generation {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;
    pub const DEFAULT: Generation = Generation(1);

    pub fn new(n: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&n).then_some(Generation(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Generation> {
        (Self::MIN..=Self::MAX).map(Generation)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Generation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Generation::new)
            .ok_or_else(|| {
                format!(
                    "génération invalide: {s} (attendu {}..={})",
                    Self::MIN,
                    Self::MAX
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub hp: u8,
    #[serde(default)]
    pub attack: u8,
    #[serde(default)]
    pub defense: u8,
    #[serde(default, rename = "special-attack")]
    pub special_attack: u8,
    #[serde(default, rename = "special-defense")]
    pub special_defense: u8,
    #[serde(default)]
    pub speed: u8,
}

impl Stats {
    pub fn total(&self) -> u16 {
        [
            self.hp,
            self.attack,
            self.defense,
            self.special_attack,
            self.special_defense,
            self.speed,
        ]
        .iter()
        .map(|v| u16::from(*v))
        .sum()
    }
}

/// Fiche d'un Pokémon. Les champs absents d'une réponse (le filtre ne renvoie
/// que id/nom/types/sprite) prennent leur valeur vide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonSummary {
    pub id: u32,
    pub name: String,
    #[serde(default, alias = "pokemon_image", deserialize_with = "null_as_empty")]
    pub sprite_url: String,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub types: Vec<PokemonType>,
}

/// PokeAPI n'a pas d'image pour certaines formes : `null` devient `""`.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterResponse {
    #[serde(default)]
    pub results: Vec<PokemonSummary>,
    #[serde(default)]
    pub count: usize,
    pub msg: Option<String>,
}

/// Corps de `POST /api/favorites/` et `POST /api/equipe/`.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipPayload {
    pub pokemon_id: u32,
    pub pokemon_name: String,
    pub pokemon_image: String,
    pub height: f64,
    pub weight: f64,
    pub abilities: Vec<Ability>,
    pub stats: Stats,
    pub types: Vec<PokemonType>,
}

impl From<&PokemonSummary> for MembershipPayload {
    fn from(p: &PokemonSummary) -> Self {
        Self {
            pokemon_id: p.id,
            pokemon_name: p.name.clone(),
            pokemon_image: p.sprite_url.clone(),
            height: p.height,
            weight: p.weight,
            abilities: p.abilities.clone(),
            stats: p.stats,
            types: p.types.clone(),
        }
    }
}
