pub mod auth;
pub mod pokemon;
pub mod user;

pub use auth::{LoginResponse, LoginUser};
pub use pokemon::{
    Ability, FilterResponse, Generation, MembershipPayload, PokemonSummary, PokemonType, Stats,
};
pub use user::{ApiMessage, ProfileUpdateResponse, RegisterUser, UpdateProfile, UserProfile};
