//! Core domain logic for RentDesk.
//! This crate is the single source of truth for business invariants.

pub mod logging;
pub mod logic;
pub mod model;
pub mod persistence;
pub mod repo;

pub use logging::{default_log_level, init_logging, logging_status};
pub use logic::calculator::{Calculator, Key, VAT_RATE};
pub use logic::id_generator::IdGenerator;
pub use model::article::Article;
pub use model::customer::{Customer, CustomerStatus, Note};
pub use model::reservation::{Reservation, ReservationStatus};
pub use model::Entity;
pub use persistence::{JsonFileStore, PersistenceProvider, ProviderError, ProviderResult};
pub use repo::entity_repo::{DuplicatePolicy, RepoError, RepoResult, Repository};
pub use repo::registry::{
    RegistryConfig, RegistryError, RegistryResult, RepositoryRegistry, StorageSelector,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
