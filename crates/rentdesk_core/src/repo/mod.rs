//! Repository layer: per-kind record stores and the registry that wires
//! them to persistence at startup.

pub mod entity_repo;
pub mod registry;
