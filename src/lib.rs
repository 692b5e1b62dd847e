pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod helpers;
pub mod list;
pub mod membership;
pub mod models;
pub mod store;

pub use app::Pokedex;
pub use error::ClientError;
pub use helpers::ApiResult;
