//! Booking orchestration errors.

use chrono::NaiveDate;
use innkeep_shared::AppError;
use innkeep_shared::types::{RoomId, StayId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::StayStatus;
use crate::calendar::DateRangeError;
use crate::deposit::DepositError;
use crate::folio::FolioError;
use crate::overbooking::OverbookingError;
use crate::repository::RepositoryError;

/// Errors raised by the booking orchestrator.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Bad date range.
    #[error(transparent)]
    InvalidRange(#[from] DateRangeError),

    /// Malformed input.
    #[error("Invalid booking input: {0}")]
    Validation(String),

    /// Room missing or foreign.
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// Stay missing or foreign.
    #[error("Stay not found: {0}")]
    StayNotFound(StayId),

    /// Room is out of order or blocked on a requested night.
    #[error("Room {room_id} is blocked on {date}")]
    RoomBlocked {
        /// Room.
        room_id: RoomId,
        /// First blocked night.
        date: NaiveDate,
    },

    /// The action is not valid from the stay's current status.
    #[error("Cannot {action} stay {stay_id} while it is {status}")]
    InvalidTransition {
        /// Stay.
        stay_id: StayId,
        /// Current status.
        status: StayStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// A checked-in stay cannot change its arrival date.
    #[error("Stay {0} is checked in; its check-in date cannot change")]
    CheckInDateLocked(StayId),

    /// Folio balance would be outstanding at checkout.
    #[error("Folio balance {balance} is not settled")]
    BalanceNotSettled {
        /// Projected balance.
        balance: Decimal,
    },

    /// Override requested by a non-elevated role.
    #[error("Only managers and admins may check out with an unsettled balance")]
    OverrideNotPermitted,

    /// Room bookings kept changing underneath us.
    #[error("Room {0} is being booked concurrently, please retry")]
    RoomContention(RoomId),

    /// Stay kept changing underneath us.
    #[error("Stay {0} is being modified concurrently, please retry")]
    StayContention(StayId),

    /// Overbooking rules rejected the booking.
    #[error(transparent)]
    Overbooking(#[from] OverbookingError),

    /// Folio step failed.
    #[error(transparent)]
    Folio(#[from] FolioError),

    /// Deposit step failed.
    #[error(transparent)]
    Deposit(#[from] DepositError),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl BookingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRange(_) => "INVALID_DATE_RANGE",
            Self::Validation(_) => "INVALID_BOOKING_INPUT",
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::StayNotFound(_) => "STAY_NOT_FOUND",
            Self::RoomBlocked { .. } => "ROOM_BLOCKED",
            Self::InvalidTransition { .. } => "INVALID_STAY_TRANSITION",
            Self::CheckInDateLocked(_) => "CHECK_IN_DATE_LOCKED",
            Self::BalanceNotSettled { .. } => "BALANCE_NOT_SETTLED",
            Self::OverrideNotPermitted => "INSUFFICIENT_ROLE",
            Self::RoomContention(_) | Self::StayContention(_) => "CONCURRENT_MODIFICATION",
            Self::Overbooking(e) => e.error_code(),
            Self::Folio(e) => e.error_code(),
            Self::Deposit(e) => e.error_code(),
            Self::Repository(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidRange(_) | Self::Validation(_) | Self::CheckInDateLocked(_) => 400,
            Self::OverrideNotPermitted => 403,
            Self::RoomNotFound(_) | Self::StayNotFound(_) => 404,
            Self::RoomBlocked { .. }
            | Self::InvalidTransition { .. }
            | Self::BalanceNotSettled { .. }
            | Self::RoomContention(_)
            | Self::StayContention(_) => 409,
            Self::Overbooking(e) => e.http_status_code(),
            Self::Folio(e) => e.http_status_code(),
            Self::Deposit(e) => e.http_status_code(),
            Self::Repository(e) => e.http_status_code(),
        }
    }

    /// Returns true when the caller hit a double-booking or capacity rule.
    #[must_use]
    pub const fn is_booking_conflict(&self) -> bool {
        matches!(
            self,
            Self::RoomBlocked { .. }
                | Self::Overbooking(
                    OverbookingError::OverbookingNotAllowed { .. } | OverbookingError::LimitExceeded { .. }
                )
        )
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Overbooking(e) => e.into(),
            BookingError::Folio(e) => e.into(),
            BookingError::Deposit(e) => e.into(),
            BookingError::Repository(e) => e.into(),
            other => crate::error::classify(other.http_status_code(), other.to_string()),
        }
    }
}
