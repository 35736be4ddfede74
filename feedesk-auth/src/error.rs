//! Error types for feedesk-auth: Railway Programming
//!
//! All operations return `Result<T, AuthError>`.
//! No panics, no unwraps in production code paths.

use thiserror::Error;

/// Unified error type for all auth operations
#[derive(Error, Debug)]
pub enum AuthError {
    // ─── Auth Errors ───

    /// Wrong email, wrong password or inactive account. Deliberately carries
    /// nothing that tells the three apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Insufficient permissions: operation={operation}, role={role}")]
    Forbidden { operation: String, role: String },

    // ─── Account Errors ───

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // ─── Infrastructure Errors ───

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Auth/authz failures are answered to the client as-is; everything else
    /// is logged and reported generically.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::Unauthenticated
                | Self::Forbidden { .. }
                | Self::UserNotFound(_)
                | Self::UserAlreadyExists(_)
                | Self::Validation(_)
        )
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(err: rusqlite::Error) -> Self {
        AuthError::Storage(err.to_string())
    }
}

impl From<r2d2::Error> for AuthError {
    fn from(err: r2d2::Error) -> Self {
        AuthError::Storage(format!("connection pool: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::Internal(format!("token signing: {err}"))
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("blocking task failed: {err}"))
    }
}

/// Result type alias for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AuthError::Unauthenticated.is_client_error());
        assert!(AuthError::Forbidden { operation: "manage_users".into(), role: "parent".into() }
            .is_client_error());
        assert!(!AuthError::Storage("disk full".into()).is_client_error());
        assert!(!AuthError::Internal("boom".into()).is_client_error());
    }
}
