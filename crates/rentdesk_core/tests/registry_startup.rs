use rentdesk_core::{
    CustomerStatus, DuplicatePolicy, Entity, RegistryConfig, RepositoryRegistry, ReservationStatus,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn first_open_seeds_fixtures_and_persists_them() {
    let dir = tempdir().unwrap();
    let config = RegistryConfig::json_file(dir.path());

    let registry = RepositoryRegistry::open(&config).unwrap();

    assert_eq!(registry.customers().len(), 9);
    assert_eq!(registry.articles().len(), 8);
    assert_eq!(registry.reservations().len(), 1);

    assert!(dir.path().join("Customer.jsonl").exists());
    assert!(dir.path().join("Article.jsonl").exists());
    assert!(dir.path().join("Reservation.jsonl").exists());

    let first_customer = &registry.customers().find_all()[0];
    assert_eq!(first_customer.full_name(), "Jens Baumann");
    assert_eq!(first_customer.contacts.len(), 3);

    let first_article = &registry.articles().find_all()[0];
    assert_eq!(first_article.short_name, "Akku-Bohrschrauber");
    assert_eq!(first_article.price, 149.99);

    let reservation = &registry.reservations().find_all()[0];
    assert_eq!(reservation.customer_id, first_customer.id());
    assert_eq!(reservation.article_ids, vec![first_article.id().to_string()]);
    assert_eq!(reservation.status, ReservationStatus::Active);
    assert!(reservation.date > 0);
}

#[test]
fn seeded_state_carries_the_expected_problem_customers() {
    let registry = RepositoryRegistry::open(&RegistryConfig::in_memory()).unwrap();

    let boese = registry
        .customers()
        .find_all()
        .iter()
        .find(|customer| customer.name == "Böse")
        .unwrap();
    assert_eq!(boese.status, CustomerStatus::Suspended);
    // creation note plus four complaints
    assert_eq!(boese.notes.len(), 5);

    let emma = registry
        .customers()
        .find_all()
        .iter()
        .find(|customer| customer.full_name() == "Emma Jones")
        .unwrap();
    assert_eq!(emma.status, CustomerStatus::Suspended);
}

#[test]
fn reopen_replays_persisted_state_instead_of_reseeding() {
    let dir = tempdir().unwrap();
    let config = RegistryConfig::json_file(dir.path());

    let first = RepositoryRegistry::open(&config).unwrap();
    let customer_ids: Vec<String> = first
        .customers()
        .find_all()
        .iter()
        .map(|record| record.id().to_string())
        .collect();
    drop(first);

    let second = RepositoryRegistry::open(&config).unwrap();

    assert_eq!(second.customers().len(), 9);
    assert_eq!(second.articles().len(), 8);
    assert_eq!(second.reservations().len(), 1);

    let replayed_ids: Vec<String> = second
        .customers()
        .find_all()
        .iter()
        .map(|record| record.id().to_string())
        .collect();
    assert_eq!(replayed_ids, customer_ids);

    let boese = second
        .customers()
        .find_all()
        .iter()
        .find(|customer| customer.name == "Böse")
        .unwrap();
    assert_eq!(boese.notes.len(), 5);
}

#[test]
fn mutations_survive_a_reopen() {
    let dir = tempdir().unwrap();
    let config = RegistryConfig::json_file(dir.path());

    let mut registry = RepositoryRegistry::open(&config).unwrap();
    let mut renamed = registry.customers().find_all()[0].clone();
    let renamed_id = renamed.id().to_string();
    renamed.name = "Baumann-Weber".to_string();
    registry.customers_mut().update(renamed, false).unwrap();

    let mut reservation = registry.reservations().create();
    reservation.customer_id = renamed_id.clone();
    registry
        .reservations_mut()
        .update(reservation, true)
        .unwrap();
    drop(registry);

    let reopened = RepositoryRegistry::open(&config).unwrap();
    let customer = reopened.customers().find_by_id(&renamed_id).unwrap();
    assert_eq!(customer.name, "Baumann-Weber");
    assert_eq!(reopened.reservations().len(), 2);
}

#[test]
fn fresh_ids_skip_replayed_records_after_reopen() {
    let dir = tempdir().unwrap();
    let config = RegistryConfig::json_file(dir.path());

    let first = RepositoryRegistry::open(&config).unwrap();
    drop(first);

    let second = RepositoryRegistry::open(&config).unwrap();
    let fresh = second.customers().create();

    assert!(second.customers().find_by_id(fresh.id()).is_none());
}

#[test]
fn empty_unit_is_reseeded_on_open() {
    let dir = tempdir().unwrap();
    let config = RegistryConfig::json_file(dir.path());

    let first = RepositoryRegistry::open(&config).unwrap();
    drop(first);
    fs::write(dir.path().join("Customer.jsonl"), "").unwrap();

    let second = RepositoryRegistry::open(&config).unwrap();

    assert_eq!(second.customers().len(), 9);
    assert_eq!(second.customers().find_all()[0].full_name(), "Jens Baumann");
    // untouched units replay instead of reseeding
    assert_eq!(second.articles().len(), 8);
    assert_eq!(second.reservations().len(), 1);
}

#[test]
fn in_memory_registry_touches_no_disk() {
    let dir = tempdir().unwrap();
    let mut config = RegistryConfig::in_memory();
    config.data_dir = dir.path().to_path_buf();

    let registry = RepositoryRegistry::open(&config).unwrap();

    assert_eq!(registry.customers().len(), 9);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn duplicate_policy_flows_from_config_into_repositories() {
    let mut config = RegistryConfig::in_memory();
    config.duplicates = DuplicatePolicy::PreferIncoming;

    let registry = RepositoryRegistry::open(&config).unwrap();

    assert_eq!(
        registry.customers().duplicate_policy(),
        DuplicatePolicy::PreferIncoming
    );
    assert_eq!(
        registry.reservations().duplicate_policy(),
        DuplicatePolicy::PreferIncoming
    );
}

#[test]
fn id_formats_differ_per_record_family() {
    let registry = RepositoryRegistry::open(&RegistryConfig::in_memory()).unwrap();

    let customer_id = registry.customers().find_all()[0].id().to_string();
    assert!(customer_id.starts_with("C."));
    assert_eq!(customer_id.len(), 9);

    assert_eq!(registry.articles().find_all()[0].id(), "00000001");

    let reservation_id = registry.reservations().find_all()[0].id().to_string();
    assert!(reservation_id.starts_with("R."));
}

#[test]
fn stop_clears_every_repository() {
    let mut registry = RepositoryRegistry::open(&RegistryConfig::in_memory()).unwrap();

    registry.stop();

    assert!(registry.customers().is_empty());
    assert!(registry.articles().is_empty());
    assert!(registry.reservations().is_empty());
}
