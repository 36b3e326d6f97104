//! Error types for the drive_enumerator crate.

use thiserror::Error;

/// Errors that can occur when interacting with Google Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Failed to read credentials file: {0}")]
    CredentialsFileError(#[from] std::io::Error),

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParseError(#[from] serde_json::Error),

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid URL or ID: {0}")]
    InvalidUrlOrId(String),
}

/// The two failure families a caller has to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing credentials, or scopes the token endpoint refused.
    Auth,
    /// Any failed call against the Drive API.
    Request,
}

impl DriveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriveError::AuthenticationError(_)
            | DriveError::CredentialsFileError(_)
            | DriveError::CredentialsParseError(_)
            | DriveError::JwtError(_)
            | DriveError::TokenRefreshError(_)
            | DriveError::MissingEnvVar(_) => ErrorKind::Auth,
            DriveError::HttpError(_)
            | DriveError::ApiError { .. }
            | DriveError::InvalidUrlOrId(_) => ErrorKind::Request,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            DriveError::AuthenticationError("no key".into()).kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            DriveError::TokenRefreshError("invalid_scope".into()).kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            DriveError::ApiError {
                status: 403,
                message: "forbidden".into()
            }
            .kind(),
            ErrorKind::Request
        );
    }

    #[test]
    fn test_parse_error_is_auth() {
        let err: DriveError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.is_auth());
    }
}
