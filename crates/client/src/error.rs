use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single request against the inventory backend.
///
/// `Clone` so a failed read can be handed to every caller waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error("json error: {0}")]
    Serde(String),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// Returns true if the error is transient and a read may be retried.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::UnexpectedStatus { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND.as_u16()),
            _ => None,
        }
    }

    /// Re-label a bare 404 with the record that was being looked up.
    pub(crate) fn not_found_as(self, resource: &'static str, id: &str) -> Self {
        match self {
            Self::UnexpectedStatus { status: 404, .. } => Self::NotFound {
                resource,
                id: id.to_string(),
            },
            other => other,
        }
    }
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else if e.is_decode() {
        ClientError::Serde(e.to_string())
    } else {
        ClientError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serde(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy() {
        assert!(ClientError::Timeout.should_retry());
        assert!(ClientError::Transport("reset".into()).should_retry());
        assert!(
            ClientError::UnexpectedStatus {
                status: 503,
                body: String::new()
            }
            .should_retry()
        );
        assert!(
            !ClientError::UnexpectedStatus {
                status: 400,
                body: String::new()
            }
            .should_retry()
        );
        assert!(
            !ClientError::NotFound {
                resource: "Exhibit",
                id: "E1".into()
            }
            .should_retry()
        );
    }

    #[test]
    fn test_not_found_relabel() {
        let err = ClientError::UnexpectedStatus {
            status: 404,
            body: "missing".into(),
        }
        .not_found_as("Part", "P9");
        assert_eq!(err.to_string(), "Part with ID P9 not found");
        assert_eq!(err.status(), Some(404));

        let other = ClientError::Timeout.not_found_as("Part", "P9");
        assert_eq!(other, ClientError::Timeout);
    }
}
