//! Record id generation.
//!
//! # Responsibility
//! - Issue ids in the numeric and airline-style formats used per record
//!   family.
//! - Validate id shapes for input checks and diagnostics.
//!
//! # Invariants
//! - `next_id` never fails, never blocks and never repeats a value within
//!   one generator instance.
//! - Generators of different record families are independent; the prefix
//!   disambiguates airline-style ids.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};

const CHECK_DIGIT_MODULUS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdFormat {
    /// Zero-padded decimal of at least the configured width.
    Numeric,
    /// Prefix, zero-padded decimal payload, one trailing check digit.
    Airline,
}

/// Monotonic id source for one record family.
///
/// The counter lives for the process lifetime; after a restart the owning
/// repository skips candidates that already exist in replayed state.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: String,
    format: IdFormat,
    digits: usize,
    counter: AtomicU64,
    shape: OnceCell<Regex>,
}

impl IdGenerator {
    /// Plain zero-padded decimal ids, e.g. `00000001` for width 8.
    pub fn numeric(digits: usize) -> Self {
        Self {
            prefix: String::new(),
            format: IdFormat::Numeric,
            digits,
            counter: AtomicU64::new(0),
            shape: OnceCell::new(),
        }
    }

    /// Airline-ticket style ids: prefix, payload digits, check digit.
    ///
    /// Width 6 with prefix `"C."` yields `C.0000011` as the first id.
    pub fn airline(prefix: impl Into<String>, digits: usize) -> Self {
        Self {
            prefix: prefix.into(),
            format: IdFormat::Airline,
            digits,
            counter: AtomicU64::new(0),
            shape: OnceCell::new(),
        }
    }

    /// Returns the next id in sequence.
    ///
    /// Safe to call from any thread at any time; the counter is atomic and
    /// the call cannot fail.
    pub fn next_id(&self) -> String {
        let payload = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        match self.format {
            IdFormat::Numeric => format!("{payload:0width$}", width = self.digits),
            IdFormat::Airline => format!(
                "{}{payload:0width$}{}",
                self.prefix,
                check_digit(payload),
                width = self.digits
            ),
        }
    }

    /// Checks whether `id` has the shape this generator produces.
    ///
    /// Airline ids additionally have their check digit recomputed. The check
    /// catches transcription slips; it is not a cryptographic property.
    pub fn matches(&self, id: &str) -> bool {
        let shape = self.shape.get_or_init(|| self.build_shape());
        if !shape.is_match(id) {
            return false;
        }
        match self.format {
            IdFormat::Numeric => true,
            IdFormat::Airline => {
                let body = &id[self.prefix.len()..];
                let (payload, check) = body.split_at(body.len() - 1);
                payload
                    .parse::<u64>()
                    .map(|value| check_digit(value).to_string() == check)
                    .unwrap_or(false)
            }
        }
    }

    fn build_shape(&self) -> Regex {
        let pattern = match self.format {
            IdFormat::Numeric => format!("^[0-9]{{{},}}$", self.digits),
            IdFormat::Airline => format!(
                "^{}[0-9]{{{},}}[0-6]$",
                regex::escape(&self.prefix),
                self.digits
            ),
        };
        Regex::new(&pattern).expect("id shape pattern is valid")
    }
}

fn check_digit(payload: u64) -> u64 {
    payload % CHECK_DIGIT_MODULUS
}
