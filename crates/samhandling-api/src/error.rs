//! Error types for the members API.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use samhandling_graph::GraphError;

/// Result type alias using `ApiError`.
pub type ApiResult<T> = Result<T, ApiError>;

pub(crate) const MISSING_KEY: &str = "Missing security key in header or query string";
pub(crate) const INVALID_KEY: &str = "Invalid security key in header or query string";

/// Error type for the members API.
///
/// Every variant maps to a fixed status except [`ApiError::Directory`], which
/// carries the status Graph answered with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required path or body parameter is absent or blank.
    #[error("Bad Request: Missing {0}")]
    MissingParameter(&'static str),

    /// No county key was presented, or it is not configured.
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// The target mail matches none of the key's allowed suffixes.
    #[error(
        "Forbidden: Mail '{mail}' does not match any allowed suffix [{}]",
        .allowed_suffixes.join(", ")
    )]
    Forbidden {
        mail: String,
        allowed_suffixes: Vec<String>,
    },

    /// A group or user lookup matched nothing.
    #[error("{0}")]
    NotFound(String),

    /// A lookup that must be unique matched several objects.
    #[error("{0}")]
    AmbiguousState(String),

    /// Graph answered with a non-success status.
    #[error("{message}")]
    Directory { status: u16, message: String },

    /// Anything else. Reported as 400 with the raw message.
    #[error("{0}")]
    Unclassified(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) | ApiError::Unclassified(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AmbiguousState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Directory { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound(message) => ApiError::NotFound(message),
            GraphError::Ambiguous(message) => ApiError::AmbiguousState(message),
            GraphError::Api { status, .. } => ApiError::Directory {
                status,
                message: err.to_string(),
            },
            other => ApiError::Unclassified(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Unclassified(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", message);
        }

        match serde_json::from_str::<serde_json::Value>(&message) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => (status, message).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header::CONTENT_TYPE;

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::MissingParameter("groupName").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized(MISSING_KEY).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden {
                mail: "a@b.no".into(),
                allowed_suffixes: vec![]
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::AmbiguousState("two".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Directory {
                status: 429,
                message: "slow down".into()
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Unclassified("boom".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::MissingParameter("userMail").to_string(),
            "Bad Request: Missing userMail"
        );
        assert_eq!(
            ApiError::Unauthorized(INVALID_KEY).to_string(),
            "Unauthorized: Invalid security key in header or query string"
        );
        assert_eq!(
            ApiError::Forbidden {
                mail: "foo@other.com".into(),
                allowed_suffixes: vec!["bar.no".into(), "example.com".into()],
            }
            .to_string(),
            "Forbidden: Mail 'foo@other.com' does not match any allowed suffix [bar.no, example.com]"
        );
    }

    #[test]
    fn test_from_graph_error() {
        let err: ApiError = GraphError::NotFound("Group with display name 'x' not found".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = GraphError::Ambiguous("Multiple groups".into()).into();
        assert!(matches!(err, ApiError::AmbiguousState(_)));

        let err: ApiError = GraphError::Api {
            status: 403,
            code: "Authorization_RequestDenied".into(),
            message: "Insufficient privileges".into(),
            context: "Failed to remove mail 'a@b.no' from group 'g'".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_string(),
            "Failed to remove mail 'a@b.no' from group 'g' : 403 Authorization_RequestDenied - Insufficient privileges"
        );

        let err: ApiError = GraphError::Auth("Token request failed".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_plain_text_body() {
        let response = ApiError::MissingParameter("groupName").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(body_string(response).await, "Bad Request: Missing groupName");
    }

    #[tokio::test]
    async fn test_json_body_when_message_is_json() {
        let response = ApiError::Directory {
            status: 409,
            message: r#"{"error":{"code":"Conflict"}}"#.into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.headers()[CONTENT_TYPE].to_str().unwrap(),
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["code"], "Conflict");
    }
}
