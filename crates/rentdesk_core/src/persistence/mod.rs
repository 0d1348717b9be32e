//! Persistence provider contract and implementations.
//!
//! # Responsibility
//! - Define the transaction protocol repositories drive against durable
//!   storage.
//! - Keep encoding and file-handling details out of the repository layer.
//!
//! # Invariants
//! - Providers are synchronous; a call has fully succeeded or failed by the
//!   time it returns.
//! - Delta operations are only valid between `prepare` and `commit`.
//!
//! # See also
//! - docs/architecture/persistence.md

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub mod json_file;

pub use json_file::JsonFileStore;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised by persistence providers.
#[derive(Debug)]
pub enum ProviderError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Codec {
        path: PathBuf,
        line: Option<usize>,
        source: serde_json::Error,
    },
    /// A transaction operation was issued in the wrong state.
    Protocol {
        operation: &'static str,
        state: &'static str,
    },
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "io failure on `{}`: {source}", path.display())
            }
            Self::Codec {
                path,
                line: Some(line),
                source,
            } => write!(f, "malformed record at {}:{line}: {source}", path.display()),
            Self::Codec {
                path,
                line: None,
                source,
            } => write!(f, "record codec failure on `{}`: {source}", path.display()),
            Self::Protocol { operation, state } => {
                write!(f, "`{operation}` is not valid in `{state}` transaction state")
            }
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Codec { source, .. } => Some(source),
            Self::Protocol { .. } => None,
        }
    }
}

/// Write-through contract between a repository and its storage unit.
///
/// Mutations arrive as one transaction per repository operation:
/// `prepare` receives the pre-change record sequence, followed by zero or
/// more delta operations, closed by a single `commit`. There is no abort
/// operation; a failed call surfaces to the repository, which discards the
/// attempt.
pub trait PersistenceProvider<E>: Send {
    /// Streams every well-formed stored record to `on_record`, in storage
    /// order. A missing storage unit is an empty replay, not an error.
    fn read_all(&mut self, on_record: &mut dyn FnMut(E)) -> ProviderResult<()>;

    /// Replaces the storage unit with exactly `records`.
    fn update_all(&mut self, records: &[E]) -> ProviderResult<()>;

    /// Opens a transaction seeded with the current record sequence.
    fn prepare(&mut self, snapshot: &[E]) -> ProviderResult<()>;

    /// Stages a newly inserted record.
    fn create(&mut self, entity: &E) -> ProviderResult<()>;

    /// Stages new field values for a stored record.
    fn update(&mut self, entity: &E) -> ProviderResult<()>;

    /// Stages removal of a stored record.
    fn delete(&mut self, entity: &E) -> ProviderResult<()>;

    /// Stages removal of every stored record.
    fn delete_all(&mut self) -> ProviderResult<()>;

    /// Atomically applies the staged transaction to the storage unit.
    fn commit(&mut self) -> ProviderResult<()>;
}
