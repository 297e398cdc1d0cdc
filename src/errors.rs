use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

/// Column hit by a storage-level uniqueness violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictField::Username => f.write_str("username"),
            ConflictField::Email => f.write_str("email"),
        }
    }
}

/// Every way registration or login can fail.
///
/// `NotFound` and `Conflict` are internal signals: the service maps them to
/// `BadCredentials` and `UsernameTaken`/`EmailTaken` before they reach a
/// caller of register/login.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("username taken")]
    UsernameTaken,
    #[error("email taken")]
    EmailTaken,
    #[error("wrong email/password combination")]
    BadCredentials,
    #[error("not found")]
    NotFound,
    #[error("{field} already exists")]
    Conflict { field: ConflictField },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Maps a sqlx error from an insert into the taxonomy. A unique-index
    /// violation (Postgres code 23505) becomes `Conflict` so the service can
    /// report which field was taken; anything else is internal.
    pub fn from_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or_default();
                if constraint.contains("username") {
                    return AuthError::Conflict {
                        field: ConflictField::Username,
                    };
                }
                if constraint.contains("email") {
                    return AuthError::Conflict {
                        field: ConflictField::Email,
                    };
                }
            }
        }
        AuthError::Internal(anyhow::Error::new(err).context("insert user"))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::UsernameTaken | AuthError::EmailTaken | AuthError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            AuthError::BadCredentials => StatusCode::UNAUTHORIZED,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }

        // Internal details stay out of the response body.
        let message = match &self {
            AuthError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
