//! Pure domain logic with no storage dependencies.
//!
//! # Responsibility
//! - Issue record identifiers in the formats the business uses.
//! - Evaluate keypad input for the built-in price calculator.

pub mod calculator;
pub mod id_generator;
