pub mod database;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use database::{CardCatalog, CatalogError};
pub use types::{BanlistStatus, Card, CardCategory, CardId};
