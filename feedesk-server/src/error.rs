//! HTTP error mapping
//!
//! Every failure leaves the server as `{"success": false, "error": "..."}`.
//! Client errors carry their message; anything else is logged and reported
//! as a generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use feedesk_auth::AuthError;

pub const MISSING_CREDENTIALS: &str = "Email and password are required";
const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Malformed or incomplete request body
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(e) if !e.is_client_error() => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
                AuthError::UserNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }

    /// Body text shown to the client
    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Auth(e) if !e.is_client_error() => INTERNAL_ERROR.into(),
            Self::Auth(e) => match e {
                AuthError::Unauthenticated => "Unauthorized".into(),
                AuthError::Forbidden { .. } => "Forbidden".into(),
                AuthError::Validation(msg) => msg.clone(),
                AuthError::UserAlreadyExists(_) => "User with this email already exists".into(),
                AuthError::UserNotFound(_) => "User not found".into(),
                _ => e.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // the enclosing request span names the route and operation
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        let body = Json(json!({ "success": false, "error": self.public_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                AuthError::Forbidden { operation: "manage_users".into(), role: "parent".into() },
                StatusCode::FORBIDDEN,
            ),
            (AuthError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AuthError::UserAlreadyExists("a@b.c".into()), StatusCode::BAD_REQUEST),
            (AuthError::UserNotFound(7), StatusCode::NOT_FOUND),
            (AuthError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_details_hidden() {
        for err in [
            AuthError::Storage("database is locked".into()),
            AuthError::Config("bad secret".into()),
            AuthError::Internal("join failed".into()),
        ] {
            let err = ApiError::from(err);
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(err.public_message(), "Internal server error");
        }
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).public_message(),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_forbidden_hides_role() {
        let err = ApiError::from(AuthError::Forbidden {
            operation: "manage_users".into(),
            role: "accountant".into(),
        });
        assert_eq!(err.public_message(), "Forbidden");
    }
}
