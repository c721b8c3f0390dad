//! Authentication and token errors
//!
//! The display strings are what GraphQL clients see for `tokenAuth`,
//! `verifyToken` and `refreshToken` failures.

use thiserror::Error;

use super::{CoreError, CoreErrorKind};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter valid credentials")]
    InvalidCredentials,

    #[error("Signature has expired")]
    SignatureExpired,

    #[error("Error decoding signature")]
    DecodeFailed,

    #[error("Invalid payload")]
    InvalidPayload,

    #[error("Refresh has expired")]
    RefreshExpired,

    #[error("User is disabled")]
    UserDisabled,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials
            | AuthError::SignatureExpired
            | AuthError::DecodeFailed
            | AuthError::InvalidPayload
            | AuthError::RefreshExpired => "UNAUTHORIZED",
            AuthError::UserDisabled => "FORBIDDEN",
            AuthError::Hashing(_) => "INTERNAL_ERROR",
            AuthError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        AuthError::Database(err.to_string())
    }
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::UserDisabled => CoreErrorKind::Forbidden,
            AuthError::Hashing(_) => CoreErrorKind::Internal,
            AuthError::Database(_) => CoreErrorKind::Database,
            _ => CoreErrorKind::Unauthorized,
        };
        CoreError::new(kind, err.to_string())
    }
}
