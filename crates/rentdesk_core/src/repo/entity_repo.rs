//! Generic in-memory repository with write-through persistence.
//!
//! # Responsibility
//! - Keep the authoritative record sequence for one record family.
//! - Drive the provider transaction protocol on every mutation.
//!
//! # Invariants
//! - No two records in a repository share an id.
//! - In-memory state changes only after the provider transaction committed;
//!   a failed commit leaves memory and storage consistent.
//! - Records enter the repository through `update(_, true)`, replay or
//!   seeding, all of which pass the same id gate.
//!
//! # See also
//! - docs/architecture/persistence.md

use crate::logic::id_generator::IdGenerator;
use crate::model::Entity;
use crate::persistence::{PersistenceProvider, ProviderError, ProviderResult};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository-level errors.
#[derive(Debug)]
pub enum RepoError {
    Provider(ProviderError),
    DuplicateId { kind: &'static str, id: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(err) => write!(f, "{err}"),
            Self::DuplicateId { kind, id } => write!(f, "duplicate {kind} id `{id}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::DuplicateId { .. } => None,
        }
    }
}

impl From<ProviderError> for RepoError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

/// Resolution for an update whose revision token does not match the stored
/// record.
///
/// A mismatch means the caller edited a copy that is not the repository's
/// current state, e.g. a stale clone kept across another update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Log the conflict and hand the stored record back unchanged.
    #[default]
    KeepStored,
    /// Log the conflict and accept the incoming values anyway.
    PreferIncoming,
}

enum Backing<E> {
    /// Purely transient repository; mutations touch memory only.
    Memory,
    Provider(Box<dyn PersistenceProvider<E>>),
}

/// In-memory record store for one record family.
///
/// Mutating operations take `&mut self`; exclusive access is what makes a
/// `prepare -> deltas -> commit` sequence atomic with respect to other
/// callers. Multi-threaded frontends wrap the repository (or the registry)
/// in a `Mutex`.
pub struct Repository<E> {
    records: Vec<E>,
    backing: Backing<E>,
    ids: IdGenerator,
    factory: fn(String) -> E,
    duplicates: DuplicatePolicy,
}

impl<E: Entity> Repository<E> {
    /// Creates an empty, memory-backed repository.
    ///
    /// `factory` builds a blank record of the family around a generated id.
    pub fn new(ids: IdGenerator, factory: fn(String) -> E) -> Self {
        Self {
            records: Vec::new(),
            backing: Backing::Memory,
            ids,
            factory,
            duplicates: DuplicatePolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicates
    }

    /// Switches the repository to write-through mode against `provider`.
    ///
    /// Replayed state is expected to be loaded before injection; the
    /// repository works identically with or without a provider.
    pub fn inject(&mut self, provider: Box<dyn PersistenceProvider<E>>) {
        self.backing = Backing::Provider(provider);
        debug!(
            "event=repo_inject module=repo status=ok kind={}",
            E::KIND
        );
    }

    /// Builds a fresh record with a generated id.
    ///
    /// The record is not stored; hand it to `update(record, true)` to
    /// insert it. Never fails. Candidate ids already present in the
    /// repository (possible after a replay, since generators restart at
    /// zero every process) are skipped.
    pub fn create(&self) -> E {
        let id = loop {
            let candidate = self.ids.next_id();
            if self.find_by_id(&candidate).is_none() {
                break candidate;
            }
        };
        (self.factory)(id)
    }

    /// Live view of all records in insertion order.
    pub fn find_all(&self) -> &[E] {
        &self.records
    }

    pub fn find_by_id(&self, id: &str) -> Option<&E> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Updates the stored record with `entity`'s id, or inserts `entity`
    /// when no such record exists and `insert` is set.
    ///
    /// Returns the authoritative record: callers must adopt the returned
    /// value, which carries the current revision token. An update whose
    /// token does not match the stored record is resolved by the
    /// configured [`DuplicatePolicy`]. With `insert == false` an unknown id
    /// is a no-op and the argument comes back unchanged.
    pub fn update(&mut self, mut entity: E, insert: bool) -> RepoResult<E> {
        let id = entity.id().to_string();
        match self.position(&id) {
            Some(index) => {
                let stored_revision = self.records[index].revision();
                if stored_revision != entity.revision() {
                    match self.duplicates {
                        DuplicatePolicy::KeepStored => {
                            error!(
                                "event=repo_update module=repo status=duplicate kind={} id={} policy=keep_stored",
                                E::KIND,
                                id
                            );
                            return Ok(self.records[index].clone());
                        }
                        DuplicatePolicy::PreferIncoming => {
                            warn!(
                                "event=repo_update module=repo status=duplicate kind={} id={} policy=prefer_incoming",
                                E::KIND,
                                id
                            );
                        }
                    }
                }
                entity.set_revision(stored_revision + 1);
                self.transact(|ta, records| {
                    ta.prepare(records)?;
                    ta.update(&entity)?;
                    ta.commit()
                })?;
                self.records[index] = entity.clone();
                info!(
                    "event=repo_update module=repo status=updated kind={} id={}",
                    E::KIND,
                    id
                );
                Ok(entity)
            }
            None => {
                if !insert {
                    debug!(
                        "event=repo_update module=repo status=skipped kind={} id={} insert=false",
                        E::KIND,
                        id
                    );
                    return Ok(entity);
                }
                entity.set_revision(1);
                self.transact(|ta, records| {
                    ta.prepare(records)?;
                    ta.create(&entity)?;
                    ta.commit()
                })?;
                self.records.push(entity.clone());
                info!(
                    "event=repo_update module=repo status=inserted kind={} id={}",
                    E::KIND,
                    id
                );
                Ok(entity)
            }
        }
    }

    /// Deletes the record with `id`; unknown ids are silently skipped.
    pub fn delete(&mut self, id: &str) -> RepoResult<()> {
        self.delete_many(&[id])
    }

    /// Deletes every listed record in exactly one provider transaction.
    ///
    /// Unknown ids are skipped; they neither fail the call nor split the
    /// transaction.
    pub fn delete_many(&mut self, ids: &[&str]) -> RepoResult<()> {
        let mut hits: Vec<String> = Vec::new();
        for id in ids {
            if self.position(id).is_some() && !hits.iter().any(|seen| seen.as_str() == *id) {
                hits.push((*id).to_string());
            }
        }

        self.transact(|ta, records| {
            ta.prepare(records)?;
            for id in &hits {
                if let Some(entity) = records.iter().find(|record| record.id() == id.as_str()) {
                    ta.delete(entity)?;
                }
            }
            ta.commit()
        })?;

        self.records
            .retain(|record| !hits.iter().any(|id| id.as_str() == record.id()));
        for id in &hits {
            info!(
                "event=repo_delete module=repo status=deleted kind={} id={}",
                E::KIND,
                id
            );
        }
        Ok(())
    }

    /// Empties the repository in one provider transaction.
    pub fn delete_all(&mut self) -> RepoResult<()> {
        self.transact(|ta, records| {
            ta.prepare(records)?;
            ta.delete_all()?;
            ta.commit()
        })?;
        self.records.clear();
        info!("event=repo_clear module=repo status=ok kind={}", E::KIND);
        Ok(())
    }

    /// Bulk-inserts fixture records and persists them as one snapshot.
    ///
    /// Registry startup path; per-record transactions are deliberately not
    /// issued here.
    pub(crate) fn seed(&mut self, mut records: Vec<E>) -> RepoResult<usize> {
        for record in &records {
            if self.position(record.id()).is_some() {
                return Err(RepoError::DuplicateId {
                    kind: E::KIND,
                    id: record.id().to_string(),
                });
            }
        }
        for record in &mut records {
            record.set_revision(1);
        }
        let count = records.len();
        self.records.append(&mut records);

        if let Backing::Provider(provider) = &mut self.backing {
            provider.update_all(&self.records)?;
        }
        Ok(count)
    }

    /// Marks the repository operational. Replay happens before this call.
    pub fn start(&self) {
        info!(
            "event=repo_start module=repo status=ok kind={} records={}",
            E::KIND,
            self.records.len()
        );
    }

    /// Drops in-memory state. Durable storage is left untouched.
    pub fn stop(&mut self) {
        self.records.clear();
        info!("event=repo_stop module=repo status=ok kind={}", E::KIND);
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// Runs one transaction against the backing provider, handing it the
    /// pre-change record sequence. Memory-backed repositories succeed
    /// without side effects.
    fn transact<F>(&mut self, apply: F) -> RepoResult<()>
    where
        F: FnOnce(&mut dyn PersistenceProvider<E>, &[E]) -> ProviderResult<()>,
    {
        let Self {
            records, backing, ..
        } = self;
        match backing {
            Backing::Memory => Ok(()),
            Backing::Provider(provider) => apply(provider.as_mut(), records).map_err(|err| {
                error!(
                    "event=repo_txn module=repo status=error kind={} error={}",
                    E::KIND,
                    err
                );
                RepoError::Provider(err)
            }),
        }
    }
}
