//! Customer domain model.
//!
//! # Responsibility
//! - Represent someone a business relationship is maintained with.
//! - Keep contact entries and attached notes with the record.
//!
//! # Invariants
//! - `id` is stable and never reused for another customer.
//! - A freshly created record starts `Active` with one creation note.
//!
//! # See also
//! - docs/architecture/data-model.md

use super::{now_epoch_ms, Entity};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a customer relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    /// Regular, serviceable customer.
    #[default]
    Active,
    /// Temporarily blocked, e.g. for unpaid invoices.
    Suspended,
    /// Relationship ended; record kept for bookkeeping.
    Terminated,
}

/// Free-text annotation attached to a customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unix epoch milliseconds at which the note was taken.
    #[serde(default)]
    pub at: i64,
    pub text: String,
}

impl Note {
    /// Creates a note stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            at: now_epoch_ms(),
            text: text.into(),
        }
    }
}

/// Customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: String,
    #[serde(skip)]
    revision: u64,
    /// Serialized as `firstname` to keep stored units stable.
    #[serde(rename = "firstname", default)]
    pub first_name: String,
    #[serde(default)]
    pub name: String,
    /// Email addresses, phone numbers and similar reachability entries.
    #[serde(default)]
    pub contacts: Vec<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub status: CustomerStatus,
}

impl Customer {
    /// Creates a blank customer record under a caller-provided id.
    ///
    /// Name fields start empty; the record carries its creation note and
    /// `Active` status from the first moment.
    pub fn with_id(id: String) -> Self {
        Self {
            id,
            revision: 0,
            first_name: String::new(),
            name: String::new(),
            contacts: Vec::new(),
            notes: vec![Note::new("Customer record created.")],
            status: CustomerStatus::Active,
        }
    }

    /// First and last name joined for display.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.name)
    }
}

impl Entity for Customer {
    const KIND: &'static str = "Customer";

    fn id(&self) -> &str {
        &self.id
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }
}
