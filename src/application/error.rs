//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("dataset unavailable: {location}")]
    DatasetUnavailable {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset is missing required column: {column}")]
    MissingColumn { column: String },

    #[error("cannot read dataset: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
