//! Availability query errors.

use innkeep_shared::AppError;
use innkeep_shared::types::{RoomCategoryId, RoomId};
use thiserror::Error;

use crate::calendar::DateRangeError;
use crate::repository::RepositoryError;

/// Errors raised by availability queries.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// Bad date range.
    #[error(transparent)]
    InvalidRange(#[from] DateRangeError),

    /// Room missing or foreign.
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// Category missing or foreign.
    #[error("Room category not found: {0}")]
    CategoryNotFound(RoomCategoryId),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AvailabilityError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRange(_) => "INVALID_DATE_RANGE",
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::Repository(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidRange(_) => 400,
            Self::RoomNotFound(_) | Self::CategoryNotFound(_) => 404,
            Self::Repository(e) => e.http_status_code(),
        }
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::Repository(e) => e.into(),
            other => crate::error::classify(other.http_status_code(), other.to_string()),
        }
    }
}
