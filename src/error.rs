// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the stores and services.

/// Application error type returned by every fallible operation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The auth provider rejected a credential operation.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// One or more writes of a bulk reset failed. Writes that succeeded
    /// are not rolled back.
    #[error("Reset incomplete: {failed} of {total} writes failed (first error: {first_error})")]
    ResetIncomplete {
        failed: usize,
        total: usize,
        first_error: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message surfaced to the UI for auth failures.
    pub fn auth(message: impl Into<String>) -> Self {
        AppError::Auth {
            message: message.into(),
        }
    }

    /// Errors the caller is expected to handle (as opposed to backend failures).
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::NotFound(_) | AppError::PermissionDenied(_)
        )
    }
}

/// Result type alias for store and service operations
pub type Result<T> = std::result::Result<T, AppError>;
