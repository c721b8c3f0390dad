//! Error types for inkpost
//!
//! - **CoreError**: service-level failures carrying a [`CoreErrorKind`]; fatal
//!   mutation failures (permission denied, database errors) travel as `CoreError`
//!   and surface as top-level GraphQL errors.
//! - **AuthError**: credential and token failures.
//!
//! Recoverable per-field problems are not errors at all; they are collected as
//! [`crate::mutation::FieldError`] values inside mutation payloads.

pub mod auth;
pub mod core_error;

pub use auth::AuthError;
pub use core_error::{CoreError, CoreErrorKind};

/// Result type alias for service operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
