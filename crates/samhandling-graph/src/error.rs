//! Error types for the Graph directory client.

use thiserror::Error;

/// Result type alias using `GraphError`.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur when talking to Microsoft Graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` token acquisition failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A lookup matched no directory object.
    #[error("{0}")]
    NotFound(String),

    /// A lookup that must be unique matched several directory objects.
    #[error("{0}")]
    Ambiguous(String),

    /// Graph answered with a non-success status.
    #[error("{context} : {status} {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        context: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl GraphError {
    /// Replaces the context of an API error. Other variants pass through.
    #[must_use]
    pub fn in_context(self, context: impl Into<String>) -> Self {
        match self {
            GraphError::Api {
                status,
                code,
                message,
                ..
            } => GraphError::Api {
                status,
                code,
                message,
                context: context.into(),
            },
            other => other,
        }
    }

    /// HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            GraphError::Api { status, .. } => Some(*status),
            GraphError::NotFound(_) => Some(404),
            GraphError::Ambiguous(_) => Some(500),
            _ => None,
        }
    }

    /// Returns true when the object does not exist, either from an empty
    /// lookup or a 404 answer.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns true when Graph refused a reference because it already exists.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        match self {
            GraphError::Api { message, .. } => message.to_lowercase().contains("already exist"),
            _ => false,
        }
    }
}
