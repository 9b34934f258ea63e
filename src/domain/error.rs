//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid inputs to the reshaping logic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("year {year} outside supported range {min}-{max}")]
    YearOutOfBounds { year: i32, min: i32, max: i32 },

    #[error("invalid year range: {min} is after {max}")]
    InvertedYearRange { min: i32, max: i32 },
}
