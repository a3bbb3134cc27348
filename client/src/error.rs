//! Error types for backend calls, session storage, and configuration.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Everything that can go wrong between the client and its collaborators.
///
/// Errors travel inside actions, so the type is `Clone` and `PartialEq`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced a readable response (network failure,
    /// non-JSON body).
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The backend answered `success: false`.
    #[error("Backend rejected the request: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Rejected {
        /// The backend's `error` field, if it sent one
        reason: Option<String>,
    },

    /// The identity credential could not be decoded.
    #[error("Invalid identity credential: {0}")]
    InvalidCredential(String),

    /// The durable session slot could not be read or written.
    #[error("Session storage failure: {0}")]
    Storage(String),

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// The backend's reason for a rejection, if it gave a non-empty one.
    #[must_use]
    pub fn backend_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason } => reason.as_deref().filter(|r| !r.is_empty()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}
