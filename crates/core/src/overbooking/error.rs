//! Overbooking errors.

use chrono::NaiveDate;
use innkeep_shared::AppError;
use innkeep_shared::types::{OverbookingAlertId, RoomCategoryId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::calendar::DateRangeError;
use crate::repository::RepositoryError;

/// Errors raised by the overbooking monitor.
#[derive(Debug, Error)]
pub enum OverbookingError {
    /// Bad threshold or setting input.
    #[error("Invalid overbooking setting: {0}")]
    InvalidSetting(String),

    /// Bad date range.
    #[error(transparent)]
    InvalidRange(#[from] DateRangeError),

    /// Caller may not change settings.
    #[error("Only managers and admins may change overbooking settings")]
    NotPermitted,

    /// Category missing or foreign.
    #[error("Room category not found: {0}")]
    CategoryNotFound(RoomCategoryId),

    /// Alert missing or foreign.
    #[error("Overbooking alert not found: {0}")]
    AlertNotFound(OverbookingAlertId),

    /// Resolution notes are mandatory.
    #[error("Resolution notes are required")]
    MissingNotes,

    /// Alert is already resolved.
    #[error("Overbooking alert {0} is already resolved")]
    AlreadyResolved(OverbookingAlertId),

    /// The category does not accept overbooking on that night.
    #[error("Overbooking is not allowed for category {category_id} on {date}")]
    OverbookingNotAllowed {
        /// Category.
        category_id: RoomCategoryId,
        /// Night.
        date: NaiveDate,
    },

    /// One more booking would exceed the configured ceiling.
    #[error("Booking would overbook category {category_id} on {date} beyond {max_percent}%")]
    LimitExceeded {
        /// Category.
        category_id: RoomCategoryId,
        /// Night.
        date: NaiveDate,
        /// Configured ceiling.
        max_percent: Decimal,
    },

    /// Alert changed underneath us too many times.
    #[error("Overbooking alert {0} is being modified concurrently, please retry")]
    ConcurrentModification(OverbookingAlertId),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl OverbookingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSetting(_) => "INVALID_OVERBOOKING_SETTING",
            Self::InvalidRange(_) => "INVALID_DATE_RANGE",
            Self::NotPermitted => "INSUFFICIENT_ROLE",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::AlertNotFound(_) => "ALERT_NOT_FOUND",
            Self::MissingNotes => "MISSING_RESOLUTION_NOTES",
            Self::AlreadyResolved(_) => "ALERT_ALREADY_RESOLVED",
            Self::OverbookingNotAllowed { .. } => "OVERBOOKING_NOT_ALLOWED",
            Self::LimitExceeded { .. } => "OVERBOOKING_LIMIT_EXCEEDED",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Repository(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidSetting(_) | Self::InvalidRange(_) | Self::MissingNotes => 400,
            Self::NotPermitted => 403,
            Self::CategoryNotFound(_) | Self::AlertNotFound(_) => 404,
            Self::AlreadyResolved(_)
            | Self::OverbookingNotAllowed { .. }
            | Self::LimitExceeded { .. }
            | Self::ConcurrentModification(_) => 409,
            Self::Repository(e) => e.http_status_code(),
        }
    }
}

impl From<OverbookingError> for AppError {
    fn from(err: OverbookingError) -> Self {
        match err {
            OverbookingError::Repository(e) => e.into(),
            other => crate::error::classify(other.http_status_code(), other.to_string()),
        }
    }
}
