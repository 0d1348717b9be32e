//! Business records shared by repository and persistence layers.
//!
//! # Responsibility
//! - Define the record shapes managed by the repositories.
//! - Expose the capability every managed record must provide.
//!
//! # Invariants
//! - Every record carries a stable, never-reused `id`.
//! - Wire formats carry domain fields only; repository bookkeeping
//!   (`revision`) never leaves the process.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::time::{SystemTime, UNIX_EPOCH};

pub mod article;
pub mod customer;
pub mod reservation;

/// Capability contract for records managed by a repository.
///
/// `KIND` names the record family; it doubles as the storage unit name and
/// as the tag in structured log events.
pub trait Entity: Clone {
    /// Record family name, e.g. `"Customer"`.
    const KIND: &'static str;

    /// Unique, immutable identifier.
    fn id(&self) -> &str;

    /// Repository handle token. Zero for records never stored; stored
    /// records carry the value stamped at insert/update time.
    fn revision(&self) -> u64;

    fn set_revision(&mut self, revision: u64);
}

/// Current wall-clock time as unix epoch milliseconds.
///
/// Clocks before the epoch collapse to zero instead of failing.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
