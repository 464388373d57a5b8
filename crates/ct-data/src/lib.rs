//! Data sources for the clinical timeline engine
//!
//! Implementations of [`ct_core::TimelineDataSource`]. The engine treats
//! sources as opaque; everything about transport, retries and caching
//! lives on this side of the boundary.

pub mod sources;

use thiserror::Error;

// Re-exports
pub use sources::InMemorySource;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("unknown subject: {0}")]
    UnknownSubject(String),
}

impl From<serde_json::Error> for DataError {
    fn from(error: serde_json::Error) -> Self {
        DataError::MalformedPayload(error.to_string())
    }
}
