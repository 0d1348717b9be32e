//! Article domain model.
//!
//! # Responsibility
//! - Represent an item offered for rent or for sale.
//!
//! # Invariants
//! - `id` is stable and never reused for another article.
//!
//! # See also
//! - docs/architecture/data-model.md

use super::Entity;
use serde::{Deserialize, Serialize};

fn placeholder() -> String {
    "-".to_string()
}

/// Rental/sale item record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    id: String,
    #[serde(skip)]
    revision: u64,
    /// Full catalog name.
    #[serde(default = "placeholder")]
    pub name: String,
    /// Short label used in compact listings.
    #[serde(default = "placeholder")]
    pub short_name: String,
    /// Price in EUR.
    #[serde(default)]
    pub price: f64,
}

impl Article {
    /// Creates a blank article record under a caller-provided id.
    pub fn with_id(id: String) -> Self {
        Self {
            id,
            revision: 0,
            name: placeholder(),
            short_name: placeholder(),
            price: 0.0,
        }
    }
}

impl Entity for Article {
    const KIND: &'static str = "Article";

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
