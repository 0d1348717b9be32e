//! JSON-lines file provider.
//!
//! # Responsibility
//! - Persist one record family as one `<KIND>.jsonl` unit, one JSON object
//!   per line.
//! - Apply transactions to a working copy and swap it in atomically.
//!
//! # Invariants
//! - A malformed line is skipped and logged; it never aborts a replay.
//! - Commits write a complete snapshot to a temp file and rename it over
//!   the unit, so readers observe either the old or the new content.
//!
//! # See also
//! - docs/architecture/persistence.md

use super::{PersistenceProvider, ProviderError, ProviderResult};
use crate::model::Entity;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

enum TxnState<E> {
    Idle,
    /// Working copy of the prepared snapshot with staged deltas applied.
    Prepared(Vec<E>),
}

/// File-backed provider storing records as JSON lines.
pub struct JsonFileStore<E> {
    path: PathBuf,
    txn: TxnState<E>,
}

impl<E: Entity> JsonFileStore<E> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            txn: TxnState::Idle,
        }
    }

    /// Store for the record family's unit under `data_dir`, e.g.
    /// `data/Customer.jsonl`.
    pub fn for_kind(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(format!("{}.jsonl", E::KIND)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn require_idle(&self, operation: &'static str) -> ProviderResult<()> {
        match self.txn {
            TxnState::Idle => Ok(()),
            TxnState::Prepared(_) => Err(ProviderError::Protocol {
                operation,
                state: "prepared",
            }),
        }
    }

    fn working_mut(&mut self, operation: &'static str) -> ProviderResult<&mut Vec<E>> {
        match &mut self.txn {
            TxnState::Prepared(working) => Ok(working),
            TxnState::Idle => Err(ProviderError::Protocol {
                operation,
                state: "idle",
            }),
        }
    }
}

impl<E> JsonFileStore<E>
where
    E: Entity + Serialize,
{
    fn write_snapshot(&self, records: &[E]) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ProviderError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut encoded = String::new();
        for record in records {
            let line = serde_json::to_string(record).map_err(|source| ProviderError::Codec {
                path: self.path.clone(),
                line: None,
                source,
            })?;
            encoded.push_str(&line);
            encoded.push('\n');
        }

        let staging = self.path.with_extension("jsonl.tmp");
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ProviderError::Io { path, source }
        };

        let mut file = File::create(&staging).map_err(io_err(&staging))?;
        file.write_all(encoded.as_bytes()).map_err(io_err(&staging))?;
        file.sync_all().map_err(io_err(&staging))?;
        fs::rename(&staging, &self.path).map_err(io_err(&self.path))?;

        debug!(
            "event=store_write module=persistence status=ok kind={} path={} records={}",
            E::KIND,
            self.path.display(),
            records.len()
        );
        Ok(())
    }
}

impl<E> PersistenceProvider<E> for JsonFileStore<E>
where
    E: Entity + Serialize + DeserializeOwned + Send,
{
    fn read_all(&mut self, on_record: &mut dyn FnMut(E)) -> ProviderResult<()> {
        self.require_idle("read_all")?;

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(
                    "event=store_replay module=persistence status=ok kind={} path={} records=0 unit=absent",
                    E::KIND,
                    self.path.display()
                );
                return Ok(());
            }
            Err(source) => {
                return Err(ProviderError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut records = 0usize;
        let mut skipped = 0usize;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| ProviderError::Io {
                path: self.path.clone(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<E>(trimmed) {
                Ok(record) => {
                    on_record(record);
                    records += 1;
                }
                Err(source) => {
                    skipped += 1;
                    warn!(
                        "event=store_replay module=persistence status=skip kind={} path={} line={} error={}",
                        E::KIND,
                        self.path.display(),
                        index + 1,
                        source
                    );
                }
            }
        }

        info!(
            "event=store_replay module=persistence status=ok kind={} path={} records={} skipped={}",
            E::KIND,
            self.path.display(),
            records,
            skipped
        );
        Ok(())
    }

    fn update_all(&mut self, records: &[E]) -> ProviderResult<()> {
        self.require_idle("update_all")?;
        self.write_snapshot(records)
    }

    fn prepare(&mut self, snapshot: &[E]) -> ProviderResult<()> {
        self.require_idle("prepare")?;
        self.txn = TxnState::Prepared(snapshot.to_vec());
        Ok(())
    }

    fn create(&mut self, entity: &E) -> ProviderResult<()> {
        let working = self.working_mut("create")?;
        working.push(entity.clone());
        Ok(())
    }

    fn update(&mut self, entity: &E) -> ProviderResult<()> {
        let working = self.working_mut("update")?;
        match working.iter_mut().find(|record| record.id() == entity.id()) {
            Some(stored) => *stored = entity.clone(),
            None => working.push(entity.clone()),
        }
        Ok(())
    }

    fn delete(&mut self, entity: &E) -> ProviderResult<()> {
        let working = self.working_mut("delete")?;
        working.retain(|record| record.id() != entity.id());
        Ok(())
    }

    fn delete_all(&mut self) -> ProviderResult<()> {
        self.working_mut("delete_all")?.clear();
        Ok(())
    }

    fn commit(&mut self) -> ProviderResult<()> {
        let working = match std::mem::replace(&mut self.txn, TxnState::Idle) {
            TxnState::Prepared(working) => working,
            TxnState::Idle => {
                return Err(ProviderError::Protocol {
                    operation: "commit",
                    state: "idle",
                })
            }
        };
        self.write_snapshot(&working)
    }
}
