//! Infrastructure layer: repositories, stores, orchestration, config.

pub mod config;
pub mod loyalty_cards;
pub mod repository;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use loyalty_cards::{LoyaltyCardError, LoyaltyCardService, filter_eligible};
pub use repository::{
    CatalogRepository, LoyaltyRepository, RepoResult, RepositoryError, Store, UnitOfWork,
};
pub use store::{InMemoryStore, InMemoryUnitOfWork};
