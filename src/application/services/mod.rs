//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services are concrete structs, not traits.

mod visualize;

pub use visualize::{BuildHandle, BuildOutcome, Published, RequestToken, VisualizeService};
