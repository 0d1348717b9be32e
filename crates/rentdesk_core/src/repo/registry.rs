//! Repository registry and startup orchestration.
//!
//! # Responsibility
//! - Construct the per-kind repositories in configuration order.
//! - Replay persisted state, inject providers and seed empty units.
//!
//! # Invariants
//! - Replay runs before provider injection, so restored records keep their
//!   persisted ids and no per-record transactions are issued.
//! - A unit is seeded only when replay left its repository empty; restarts
//!   never stack fixture data.
//!
//! # See also
//! - docs/architecture/persistence.md

use crate::logic::id_generator::IdGenerator;
use crate::model::article::Article;
use crate::model::customer::{Customer, CustomerStatus, Note};
use crate::model::reservation::Reservation;
use crate::model::Entity;
use crate::persistence::{JsonFileStore, PersistenceProvider, ProviderError};
use crate::repo::entity_repo::{DuplicatePolicy, RepoError, Repository};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::PathBuf;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while opening the registry.
#[derive(Debug)]
pub enum RegistryError {
    DataDir { path: PathBuf, source: io::Error },
    Provider(ProviderError),
    Repo(RepoError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataDir { path, source } => {
                write!(f, "cannot prepare data directory `{}`: {source}", path.display())
            }
            Self::Provider(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DataDir { source, .. } => Some(source),
            Self::Provider(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ProviderError> for RegistryError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<RepoError> for RegistryError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Storage wiring for a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSelector {
    /// JSON-lines units under the configured data directory.
    JsonFile,
    /// No provider; repositories stay transient.
    Memory,
}

/// Startup configuration for [`RepositoryRegistry::open`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub data_dir: PathBuf,
    pub storage: StorageSelector,
    pub duplicates: DuplicatePolicy,
}

impl RegistryConfig {
    /// File-backed registry with units under `data_dir`.
    pub fn json_file(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            storage: StorageSelector::JsonFile,
            duplicates: DuplicatePolicy::default(),
        }
    }

    /// Transient registry; nothing is read from or written to disk.
    pub fn in_memory() -> Self {
        Self {
            data_dir: PathBuf::new(),
            storage: StorageSelector::Memory,
            duplicates: DuplicatePolicy::default(),
        }
    }
}

/// The application's repositories, one per record family.
///
/// Construction is explicit; independent registries never share state,
/// which keeps tests and embedded uses isolated.
pub struct RepositoryRegistry {
    customers: Repository<Customer>,
    articles: Repository<Article>,
    reservations: Repository<Reservation>,
}

impl RepositoryRegistry {
    /// Opens the registry: replay, provider injection, fixture seeding and
    /// start, per repository, in configuration order.
    pub fn open(config: &RegistryConfig) -> RegistryResult<Self> {
        if config.storage == StorageSelector::JsonFile {
            fs::create_dir_all(&config.data_dir).map_err(|source| RegistryError::DataDir {
                path: config.data_dir.clone(),
                source,
            })?;
        }

        let mut customers = Repository::new(IdGenerator::airline("C.", 6), Customer::with_id)
            .with_duplicate_policy(config.duplicates);
        configure(&mut customers, config, customer_fixture)?;

        let mut articles = Repository::new(IdGenerator::numeric(8), Article::with_id)
            .with_duplicate_policy(config.duplicates);
        configure(&mut articles, config, article_fixture)?;

        let mut reservations = Repository::new(IdGenerator::airline("R.", 6), Reservation::with_id)
            .with_duplicate_policy(config.duplicates);
        configure(&mut reservations, config, |repo| {
            reservation_fixture(repo, &customers, &articles)
        })?;

        info!(
            "event=registry_open module=registry status=ok customers={} articles={} reservations={}",
            customers.len(),
            articles.len(),
            reservations.len()
        );
        Ok(Self {
            customers,
            articles,
            reservations,
        })
    }

    pub fn customers(&self) -> &Repository<Customer> {
        &self.customers
    }

    pub fn customers_mut(&mut self) -> &mut Repository<Customer> {
        &mut self.customers
    }

    pub fn articles(&self) -> &Repository<Article> {
        &self.articles
    }

    pub fn articles_mut(&mut self) -> &mut Repository<Article> {
        &mut self.articles
    }

    pub fn reservations(&self) -> &Repository<Reservation> {
        &self.reservations
    }

    pub fn reservations_mut(&mut self) -> &mut Repository<Reservation> {
        &mut self.reservations
    }

    /// Stops every repository in configuration order.
    pub fn stop(&mut self) {
        self.customers.stop();
        self.articles.stop();
        self.reservations.stop();
        info!("event=registry_stop module=registry status=ok");
    }
}

/// Startup sequence for one repository: replay persisted records through
/// the regular insert gate, hand the provider over, seed the unit when the
/// replay produced nothing, then start.
fn configure<E, F>(
    repo: &mut Repository<E>,
    config: &RegistryConfig,
    fixture: F,
) -> RegistryResult<()>
where
    E: Entity + Serialize + DeserializeOwned + Send + 'static,
    F: FnOnce(&Repository<E>) -> Vec<E>,
{
    if config.storage == StorageSelector::JsonFile {
        let mut provider: JsonFileStore<E> = JsonFileStore::for_kind(&config.data_dir);
        let mut replayed = 0usize;
        provider.read_all(&mut |record: E| {
            // memory-backed until injection; replay inserts cannot fail
            let _ = repo.update(record, true);
            replayed += 1;
        })?;
        repo.inject(Box::new(provider));
        info!(
            "event=registry_replay module=registry status=ok kind={} records={}",
            E::KIND,
            replayed
        );
    }

    if repo.is_empty() {
        let records = fixture(repo);
        let seeded = repo.seed(records)?;
        info!(
            "event=registry_seed module=registry status=ok kind={} records={}",
            E::KIND,
            seeded
        );
    }

    repo.start();
    Ok(())
}

fn named_customer(repo: &Repository<Customer>, first_name: &str, name: &str) -> Customer {
    let mut record = repo.create();
    record.first_name = first_name.to_string();
    record.name = name.to_string();
    record
}

fn catalog_article(
    repo: &Repository<Article>,
    name: &str,
    short_name: &str,
    price: f64,
) -> Article {
    let mut record = repo.create();
    record.name = name.to_string();
    record.short_name = short_name.to_string();
    record.price = price;
    record
}

fn customer_fixture(repo: &Repository<Customer>) -> Vec<Customer> {
    let mut records = Vec::new();

    let mut jens = named_customer(repo, "Jens", "Baumann");
    jens.contacts.push("eme@yahoo.com".to_string());
    jens.contacts.push("meyer244@gmail.com".to_string());
    jens.contacts.push("+49170482395".to_string());
    records.push(jens);

    records.push(named_customer(repo, "Anne", "Meyer"));

    let mut jacob = named_customer(repo, "Jacob", "Schneider");
    jacob.contacts.push("jacob.schneider@example.com".to_string());
    records.push(jacob);

    let mut isabella = named_customer(repo, "Isabella", "Johnson");
    isabella.contacts.push("isabella.johnson@example.com".to_string());
    isabella.status = CustomerStatus::Suspended;
    records.push(isabella);

    let mut ethan = named_customer(repo, "Ethan", "Williams");
    ethan.contacts.push("ethan.williams@example.com".to_string());
    records.push(ethan);

    let mut emma = named_customer(repo, "Emma", "Jones");
    emma.contacts.push("emma.jones@example.com".to_string());
    emma.status = CustomerStatus::Suspended;
    records.push(emma);

    let mut michael = named_customer(repo, "Michael", "Brown");
    michael.contacts.push("michael.brown@example.com".to_string());
    records.push(michael);

    let mut pierre = named_customer(repo, "Pierre", "Faparius");
    pierre.contacts.push("p.fap@tuxedo.org".to_string());
    pierre.status = CustomerStatus::Suspended;
    records.push(pierre);

    let mut boese = named_customer(repo, "Dr. Mararethe", "Böse");
    boese.contacts.push("drmb@yahoo.de".to_string());
    boese.contacts.push("030 826 5204".to_string());
    boese.status = CustomerStatus::Suspended;
    boese.notes.push(Note::new("Zahlt Rechnung verspätet"));
    boese.notes.push(Note::new("Beschwert sich über Mitarbeiter"));
    boese.notes.push(Note::new("Greift Angestellte verbal an"));
    boese.notes.push(Note::new("Wurde aus dem Geschäft verwiesen"));
    records.push(boese);

    records
}

fn article_fixture(repo: &Repository<Article>) -> Vec<Article> {
    vec![
        catalog_article(
            repo,
            "Makita Akku-Bohrschrauber 18V / 5,0 Ah",
            "Akku-Bohrschrauber",
            149.99,
        ),
        catalog_article(
            repo,
            "Makita DUC353Z Akku-Kettensäge 2x18V / 35 cm",
            "Akku-Kettensäge",
            189.99,
        ),
        catalog_article(
            repo,
            "Makita HP2051FJ Schlagbohrmaschine 720 W mit LED",
            "Schlagbohrmaschine",
            179.99,
        ),
        catalog_article(
            repo,
            "Makita 9558HNRG Winkelschleifer 125 mm 840 W",
            "Winkelschleifer",
            99.99,
        ),
        catalog_article(
            repo,
            "Makita BO3711 Schwingschleifer 93 x 228 mm",
            "Schwingschleifer",
            159.99,
        ),
        catalog_article(
            repo,
            "Makita DLM380Z Akku-Rasenmäher 2 x 18 V",
            "Elektro-Rasenmäher",
            349.99,
        ),
        catalog_article(
            repo,
            "Makita DVC860LZ Akku-Staubsauger 2x18V",
            "Gebläse/Sauger",
            499.99,
        ),
        catalog_article(
            repo,
            "Makita P-90532 Werkzeug-Set 227-teilig 8 x 160 mm",
            "Werkzeugset 227tl",
            199.99,
        ),
    ]
}

fn reservation_fixture(
    repo: &Repository<Reservation>,
    customers: &Repository<Customer>,
    articles: &Repository<Article>,
) -> Vec<Reservation> {
    let mut records = Vec::new();
    if let (Some(customer), Some(article)) =
        (customers.find_all().first(), articles.find_all().first())
    {
        let mut reservation = repo.create();
        reservation.customer_id = customer.id().to_string();
        reservation.add_article(article.id());
        records.push(reservation);
    }
    records
}
