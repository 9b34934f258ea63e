//! Application layer: dataset loading and services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod dataset;
pub mod error;
pub mod error_ext;
pub mod services;

pub use dataset::{load_dataset, parse_dataset, Dataset, DropReason, LoadReport, RowOutcome};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
