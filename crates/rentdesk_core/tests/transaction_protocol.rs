use rentdesk_core::{
    Customer, Entity, IdGenerator, PersistenceProvider, ProviderError, ProviderResult, RepoError,
    Repository, RepositoryRegistry,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ProviderCall {
    Prepare(usize),
    Create(String),
    Update(String),
    Delete(String),
    DeleteAll,
    Commit,
    UpdateAll(usize),
}

/// Test double that records the call sequence instead of persisting.
struct RecordingProvider {
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    fail_on_commit: bool,
}

impl<E: Entity> PersistenceProvider<E> for RecordingProvider {
    fn read_all(&mut self, _on_record: &mut dyn FnMut(E)) -> ProviderResult<()> {
        Ok(())
    }

    fn update_all(&mut self, records: &[E]) -> ProviderResult<()> {
        self.record(ProviderCall::UpdateAll(records.len()));
        Ok(())
    }

    fn prepare(&mut self, snapshot: &[E]) -> ProviderResult<()> {
        self.record(ProviderCall::Prepare(snapshot.len()));
        Ok(())
    }

    fn create(&mut self, entity: &E) -> ProviderResult<()> {
        self.record(ProviderCall::Create(entity.id().to_string()));
        Ok(())
    }

    fn update(&mut self, entity: &E) -> ProviderResult<()> {
        self.record(ProviderCall::Update(entity.id().to_string()));
        Ok(())
    }

    fn delete(&mut self, entity: &E) -> ProviderResult<()> {
        self.record(ProviderCall::Delete(entity.id().to_string()));
        Ok(())
    }

    fn delete_all(&mut self) -> ProviderResult<()> {
        self.record(ProviderCall::DeleteAll);
        Ok(())
    }

    fn commit(&mut self) -> ProviderResult<()> {
        self.record(ProviderCall::Commit);
        if self.fail_on_commit {
            return Err(ProviderError::Io {
                path: PathBuf::from("recording"),
                source: io::Error::new(io::ErrorKind::Other, "injected commit failure"),
            });
        }
        Ok(())
    }
}

impl RecordingProvider {
    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[test]
fn insert_runs_one_prepare_create_commit_transaction() {
    let (calls, mut repo) = recording_repo(false);

    let record = repo.update(named(&repo, "Jens", "Baumann"), true).unwrap();

    let seen = calls.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ProviderCall::Prepare(0),
            ProviderCall::Create(record.id().to_string()),
            ProviderCall::Commit,
        ]
    );
}

#[test]
fn update_runs_one_prepare_update_commit_transaction() {
    let (calls, mut repo) = recording_repo(false);
    let mut stored = repo.update(named(&repo, "Anne", "Meyer"), true).unwrap();
    calls.lock().unwrap().clear();

    stored.contacts.push("anne@example.com".to_string());
    let updated = repo.update(stored, false).unwrap();

    let seen = calls.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ProviderCall::Prepare(1),
            ProviderCall::Update(updated.id().to_string()),
            ProviderCall::Commit,
        ]
    );
}

#[test]
fn batch_delete_is_a_single_transaction() {
    let (calls, mut repo) = recording_repo(false);
    let a = repo.update(named(&repo, "Jens", "Baumann"), true).unwrap();
    let b = repo.update(named(&repo, "Anne", "Meyer"), true).unwrap();
    let c = repo.update(named(&repo, "Jacob", "Schneider"), true).unwrap();
    calls.lock().unwrap().clear();

    repo.delete_many(&[a.id(), c.id(), "C.9999999"]).unwrap();

    let seen = calls.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ProviderCall::Prepare(3),
            ProviderCall::Delete(a.id().to_string()),
            ProviderCall::Delete(c.id().to_string()),
            ProviderCall::Commit,
        ]
    );
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.find_all()[0].id(), b.id());
}

#[test]
fn batch_delete_without_hits_still_commits() {
    let (calls, mut repo) = recording_repo(false);
    repo.update(named(&repo, "Jens", "Baumann"), true).unwrap();
    calls.lock().unwrap().clear();

    repo.delete_many(&["C.9999999"]).unwrap();

    let seen = calls.lock().unwrap().clone();
    assert_eq!(seen, vec![ProviderCall::Prepare(1), ProviderCall::Commit]);
    assert_eq!(repo.len(), 1);
}

#[test]
fn delete_all_runs_one_transaction() {
    let (calls, mut repo) = recording_repo(false);
    repo.update(named(&repo, "Jens", "Baumann"), true).unwrap();
    repo.update(named(&repo, "Anne", "Meyer"), true).unwrap();
    calls.lock().unwrap().clear();

    repo.delete_all().unwrap();

    let seen = calls.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ProviderCall::Prepare(2),
            ProviderCall::DeleteAll,
            ProviderCall::Commit,
        ]
    );
    assert!(repo.is_empty());
}

#[test]
fn failed_commit_leaves_memory_unchanged() {
    let (calls, mut repo) = recording_repo(true);

    let err = repo
        .update(named(&repo, "Jens", "Baumann"), true)
        .unwrap_err();

    assert!(matches!(err, RepoError::Provider(ProviderError::Io { .. })));
    assert!(repo.is_empty());
    let seen = calls.lock().unwrap().clone();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[2], ProviderCall::Commit);
}

#[test]
fn rejected_stale_update_issues_no_transaction() {
    let (calls, mut repo) = recording_repo(false);
    let stored = repo.update(named(&repo, "Jacob", "Schneider"), true).unwrap();
    let mut stale = stored.clone();

    let mut current = stored;
    current.name = "Schneider-Berg".to_string();
    repo.update(current, false).unwrap();
    calls.lock().unwrap().clear();

    stale.name = "Altmann".to_string();
    repo.update(stale, false).unwrap();

    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn skipped_non_insert_issues_no_transaction() {
    let (calls, mut repo) = recording_repo(false);

    repo.update(named(&repo, "Anne", "Meyer"), false).unwrap();

    assert!(calls.lock().unwrap().is_empty());
    assert!(repo.is_empty());
}

#[test]
fn registry_and_repositories_are_send() {
    assert_send::<RepositoryRegistry>();
    assert_send::<Repository<Customer>>();
}

fn assert_send<T: Send>() {}

fn recording_repo(
    fail_on_commit: bool,
) -> (Arc<Mutex<Vec<ProviderCall>>>, Repository<Customer>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let provider = RecordingProvider {
        calls: Arc::clone(&calls),
        fail_on_commit,
    };
    let mut repo = Repository::new(IdGenerator::airline("C.", 6), Customer::with_id);
    repo.inject(Box::new(provider));
    (calls, repo)
}

fn named(repo: &Repository<Customer>, first_name: &str, name: &str) -> Customer {
    let mut record = repo.create();
    record.first_name = first_name.to_string();
    record.name = name.to_string();
    record
}
