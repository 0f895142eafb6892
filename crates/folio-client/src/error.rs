//! Error types for the Folio client.

use folio_common::models::ErrorPayload;
use serde_json::Value;
use thiserror::Error;

/// A non-2xx response from the API.
#[derive(Debug, Clone, Error)]
#[error("API error {status}: {message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    /// Parsed response body, if there was one.
    pub payload: Option<Value>,
}

impl ApiError {
    /// Build an error from a status and the parsed body.
    ///
    /// The message prefers the body's `message`, then its `error` field.
    pub fn from_response(status: u16, payload: Option<Value>) -> Self {
        let message = payload
            .as_ref()
            .and_then(|body| {
                ["message", "error"].into_iter().find_map(|key| {
                    body.get(key)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned)
                })
            })
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        Self { message, status, payload }
    }

    /// The payload in its documented shape, when it has one.
    pub fn error_payload(&self) -> Option<ErrorPayload> {
        self.payload
            .as_ref()
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[derive(Debug, Error)]
pub enum FolioError {
    /// The HTTP response had a non-2xx status code.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An error from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller's cancellation token fired before the response arrived.
    #[error("Request cancelled")]
    Cancelled,

    /// The access token carried no usable user id.
    #[error("Token does not identify a user")]
    IncompleteIdentity,

    /// A login or refresh response lacked one of the two tokens.
    #[error("Response did not contain both tokens")]
    MissingTokens,

    /// A generic error string.
    #[error("{0}")]
    Other(String),
}

impl FolioError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_prefers_server_message() {
        let err = ApiError::from_response(
            400,
            Some(json!({ "error": "Bad Request", "message": "title is required" })),
        );
        assert_eq!(err.message, "title is required");
    }

    #[test]
    fn message_falls_back_to_error_field() {
        let err = ApiError::from_response(403, Some(json!({ "error": "Forbidden" })));
        assert_eq!(err.message, "Forbidden");
    }

    #[test]
    fn message_falls_back_to_status() {
        assert_eq!(ApiError::from_response(502, None).message, "Request failed with status 502");
        let err = ApiError::from_response(500, Some(json!("upstream exploded")));
        assert_eq!(err.message, "Request failed with status 500");
        assert!(err.error_payload().is_none());
    }

    #[test]
    fn status_is_exposed() {
        let err: FolioError = ApiError::from_response(404, None).into();
        assert_eq!(err.status(), Some(404));
        assert_eq!(FolioError::Cancelled.status(), None);
    }
}
