//! Night audit errors.

use chrono::NaiveDate;
use innkeep_shared::AppError;
use thiserror::Error;

use crate::calendar::DateRangeError;
use crate::repository::RepositoryError;

/// Errors raised by the night audit engine.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The caller's role cannot run audits.
    #[error("Role is not allowed to run the night audit")]
    NotPermitted,

    /// The day has not happened yet.
    #[error("Cannot audit {date}: it is after the current business date {today}")]
    FutureDate {
        /// Requested date.
        date: NaiveDate,
        /// Current business date.
        today: NaiveDate,
    },

    /// A record exists or another run holds the claim.
    #[error("Night audit for {0} has already been run")]
    AlreadyAudited(NaiveDate),

    /// No completed record for the date.
    #[error("No night audit record for {0}")]
    RecordNotFound(NaiveDate),

    /// Bad listing range.
    #[error(transparent)]
    InvalidRange(#[from] DateRangeError),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuditError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotPermitted => "AUDIT_NOT_PERMITTED",
            Self::FutureDate { .. } => "AUDIT_DATE_IN_FUTURE",
            Self::AlreadyAudited(_) => "AUDIT_ALREADY_RUN",
            Self::RecordNotFound(_) => "AUDIT_NOT_FOUND",
            Self::InvalidRange(_) => "INVALID_DATE_RANGE",
            Self::Repository(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotPermitted => 403,
            Self::FutureDate { .. } | Self::InvalidRange(_) => 400,
            Self::AlreadyAudited(_) => 409,
            Self::RecordNotFound(_) => 404,
            Self::Repository(e) => e.http_status_code(),
        }
    }
}

impl From<AuditError> for AppError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Repository(e) => e.into(),
            other => crate::error::classify(other.http_status_code(), other.to_string()),
        }
    }
}
