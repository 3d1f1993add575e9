//! Folio ledger errors.

use innkeep_shared::AppError;
use innkeep_shared::types::{FolioId, PaymentId, StayId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::FolioStatus;
use crate::repository::RepositoryError;

/// Errors raised by folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Charge description is blank.
    #[error("Charge description is required")]
    EmptyDescription,

    /// Quantity below one.
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    /// Unit amount below zero.
    #[error("Unit amount cannot be negative")]
    NegativeUnitAmount,

    /// Tax rate outside `[0, 100]`.
    #[error("Tax rate must be between 0 and 100, got {0}")]
    InvalidTaxRate(Decimal),

    /// Payment amount not positive.
    #[error("Payment amount must be positive")]
    NonPositiveAmount,

    /// Reason required for this action.
    #[error("A reason is required")]
    MissingReason,

    /// Folio missing or foreign.
    #[error("Folio not found: {0}")]
    NotFound(FolioId),

    /// Stay missing or foreign.
    #[error("Stay not found: {0}")]
    StayNotFound(StayId),

    /// Payment not on this folio.
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Folio no longer accepts changes.
    #[error("Folio {folio_id} is {status}")]
    NotOpen {
        /// Folio.
        folio_id: FolioId,
        /// Its status.
        status: FolioStatus,
    },

    /// Payment already refunded or voided.
    #[error("Payment {0} is not completed")]
    PaymentNotCompleted(PaymentId),

    /// Balance outstanding at close.
    #[error("Folio balance {balance} is not settled")]
    BalanceNotSettled {
        /// Outstanding balance.
        balance: Decimal,
    },

    /// Override requested by a non-elevated role.
    #[error("Only managers and admins may override an unsettled balance")]
    OverrideNotPermitted,

    /// Void requested by a non-elevated role.
    #[error("Only managers and admins may void a folio")]
    VoidNotPermitted,

    /// Stored totals disagree with the items.
    #[error("Folio {folio_id} ledger mismatch: {detail}")]
    LedgerMismatch {
        /// Folio.
        folio_id: FolioId,
        /// What disagrees.
        detail: String,
    },

    /// Folio changed underneath us too many times.
    #[error("Folio {0} is being modified concurrently, please retry")]
    ConcurrentModification(FolioId),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl FolioError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::NegativeUnitAmount => "NEGATIVE_AMOUNT",
            Self::InvalidTaxRate(_) => "INVALID_TAX_RATE",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::MissingReason => "MISSING_REASON",
            Self::NotFound(_) => "FOLIO_NOT_FOUND",
            Self::StayNotFound(_) => "STAY_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::NotOpen { .. } => "FOLIO_NOT_OPEN",
            Self::PaymentNotCompleted(_) => "PAYMENT_NOT_COMPLETED",
            Self::BalanceNotSettled { .. } => "BALANCE_NOT_SETTLED",
            Self::OverrideNotPermitted | Self::VoidNotPermitted => "INSUFFICIENT_ROLE",
            Self::LedgerMismatch { .. } => "LEDGER_MISMATCH",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Repository(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptyDescription
            | Self::InvalidQuantity(_)
            | Self::NegativeUnitAmount
            | Self::InvalidTaxRate(_)
            | Self::NonPositiveAmount
            | Self::MissingReason => 400,

            Self::OverrideNotPermitted | Self::VoidNotPermitted => 403,

            Self::NotFound(_) | Self::StayNotFound(_) | Self::PaymentNotFound(_) => 404,

            Self::NotOpen { .. }
            | Self::PaymentNotCompleted(_)
            | Self::BalanceNotSettled { .. }
            | Self::ConcurrentModification(_) => 409,

            Self::LedgerMismatch { .. } => 500,

            Self::Repository(e) => e.http_status_code(),
        }
    }
}

impl From<FolioError> for AppError {
    fn from(err: FolioError) -> Self {
        match err {
            FolioError::Repository(e) => e.into(),
            FolioError::LedgerMismatch { .. } => Self::Integrity(err.to_string()),
            other => crate::error::classify(other.http_status_code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_maps_to_integrity() {
        let err = FolioError::LedgerMismatch {
            folio_id: FolioId::new(),
            detail: "balance".into(),
        };
        assert_eq!(err.http_status_code(), 500);
        assert!(matches!(AppError::from(err), AppError::Integrity(_)));
    }

    #[test]
    fn test_not_open_is_conflict() {
        let err = FolioError::NotOpen {
            folio_id: FolioId::new(),
            status: FolioStatus::Closed,
        };
        assert_eq!(err.error_code(), "FOLIO_NOT_OPEN");
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }
}
