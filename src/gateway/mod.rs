pub mod catalog;
pub mod membership;
pub mod profile;

pub use catalog::{CatalogSource, HttpCatalog};
pub use membership::{HttpMembershipRemote, MembershipRemote};
pub use profile::ProfileGateway;
