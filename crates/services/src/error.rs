use client::ClientError;
use thiserror::Error;

use crate::services::{query_cache::QueryError, shell::ShellError};

/// Failure of a query or mutation, as surfaced to the front end.
///
/// `Clone` so the same outcome can be published to every watcher of a mutation.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error("user profile unavailable")]
    ProfileUnavailable,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("mutation task failed: {0}")]
    Task(String),
    /// The part itself was written; attaching it to its exhibits was not finished.
    #[error("part {part_id} was saved but linking it to exhibits failed: {source}")]
    LinkFailed {
        part_id: String,
        #[source]
        source: Box<ServiceError>,
    },
}

impl ServiceError {
    /// The underlying HTTP status, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client(e) | Self::Query(QueryError::Client(e)) => e.status(),
            Self::LinkFailed { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Client(ClientError::NotFound { .. })
                | Self::Query(QueryError::Client(ClientError::NotFound { .. }))
        )
    }
}
