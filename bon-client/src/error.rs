//! Client error types

use shared::error::{AppError, ErrorCode};
use shared::http::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required or password rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (rejected before or by the API)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Structured API error with business code
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the backend reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::NotFound(_) => true,
            ClientError::Api { code, .. } => ErrorCode::try_from(*code)
                .map(|c| matches!(c, ErrorCode::NotFound | ErrorCode::OrderNotFound))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Whether retrying on the next poll cycle may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(_) | ClientError::Internal(_) => true,
            ClientError::Api { code, .. } => matches!(
                ErrorCode::try_from(*code),
                Ok(ErrorCode::NetworkError | ErrorCode::TimeoutError)
            ),
            _ => false,
        }
    }
}

impl From<AppError> for ClientError {
    /// Same status mapping as HTTP responses; codes without a dedicated
    /// variant keep their business code in [`ClientError::Api`].
    fn from(err: AppError) -> Self {
        match err.http_status() {
            StatusCode::BAD_REQUEST => ClientError::Validation(err.message),
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(err.message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(err.message),
            StatusCode::NOT_FOUND => ClientError::NotFound(err.message),
            StatusCode::INTERNAL_SERVER_ERROR => ClientError::Internal(err.message),
            _ => ClientError::Api {
                code: err.code.code(),
                message: err.message,
            },
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(ClientError::NotFound("order".into()).is_not_found());
        assert!(
            ClientError::Api {
                code: ErrorCode::OrderNotFound.code(),
                message: "gone".into()
            }
            .is_not_found()
        );
        assert!(!ClientError::Internal("boom".into()).is_not_found());
        assert!(!ClientError::Api { code: 60000, message: "?".into() }.is_not_found());
    }

    #[test]
    fn test_app_error_conversion() {
        let err: ClientError = AppError::validation("title must not be empty").into();
        assert!(matches!(err, ClientError::Validation(m) if m.contains("title")));

        let err: ClientError = AppError::invalid_credentials().into();
        assert!(matches!(err, ClientError::Unauthorized(_)));

        let err: ClientError = AppError::new(ErrorCode::AlreadyExists).into();
        assert!(matches!(err, ClientError::Api { code: 4, .. }));
    }
}
