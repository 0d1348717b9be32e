//! Reservation domain model.
//!
//! # Responsibility
//! - Tie a customer to the articles held for them at a point in time.
//!
//! # Invariants
//! - `id` is stable and never reused for another reservation.
//! - `customer_id` always holds a value; unresolved references read `"-"`.
//!
//! # See also
//! - docs/architecture/data-model.md

use super::{now_epoch_ms, Entity};
use serde::{Deserialize, Serialize};

fn unresolved_ref() -> String {
    "-".to_string()
}

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[default]
    Active,
    Suspended,
    Terminated,
    NotConfirmed,
}

/// Reservation record.
///
/// Stored units omit `aids` when no article is attached; decoding restores
/// the omissions to their defaults so older units stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    id: String,
    #[serde(skip)]
    revision: u64,
    /// Id of the reserving customer, serialized as `cid`.
    #[serde(rename = "cid", default = "unresolved_ref")]
    pub customer_id: String,
    /// Reservation time as unix epoch milliseconds.
    #[serde(default)]
    pub date: i64,
    /// Ids of the reserved articles, serialized as `aids`.
    #[serde(rename = "aids", default, skip_serializing_if = "Vec::is_empty")]
    pub article_ids: Vec<String>,
    #[serde(default)]
    pub status: ReservationStatus,
}

impl Reservation {
    /// Creates a reservation record under a caller-provided id, dated now.
    pub fn with_id(id: String) -> Self {
        Self {
            id,
            revision: 0,
            customer_id: unresolved_ref(),
            date: now_epoch_ms(),
            article_ids: Vec::new(),
            status: ReservationStatus::Active,
        }
    }

    /// Attaches one article to this reservation.
    pub fn add_article(&mut self, article_id: impl Into<String>) {
        self.article_ids.push(article_id.into());
    }
}

impl Entity for Reservation {
    const KIND: &'static str = "Reservation";

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
