//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;

pub use builder::{continents, BranchAggregates, TreeBuilder};
pub use entities::*;
pub use error::DomainError;
