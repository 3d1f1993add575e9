//! Application-wide error types.
//!
//! Every module-level error in the workspace converts into [`AppError`], which
//! is what the HTTP layer turns into a response.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The principal lacks the role required for the action.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found, or owned by another tenant.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// State conflict (overlapping booking, duplicate audit run, duplicate name).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored state is inconsistent and needs manual reconciliation.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Integrity(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Integrity(_) => "INTEGRITY_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for errors whose details must not be echoed to clients.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::Forbidden(String::new()), 403, "FORBIDDEN")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(AppError::Integrity(String::new()), 500, "INTEGRITY_ERROR")]
    #[case(AppError::Database(String::new()), 500, "DATABASE_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_server_error_flag() {
        assert!(AppError::Integrity("x".into()).is_server_error());
        assert!(!AppError::Conflict("x".into()).is_server_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Conflict("room 101 is booked".into()).to_string(),
            "Conflict: room 101 is booked"
        );
        assert_eq!(
            AppError::NotFound("stay".into()).to_string(),
            "Not found: stay"
        );
        assert_eq!(
            AppError::Integrity("folio drift".into()).to_string(),
            "Integrity error: folio drift"
        );
    }
}
