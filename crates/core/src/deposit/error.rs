//! Deposit errors.

use innkeep_shared::AppError;
use innkeep_shared::types::{DepositPaymentId, StayId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::repository::RepositoryError;

/// Errors raised by deposit operations.
#[derive(Debug, Error)]
pub enum DepositError {
    /// Malformed policy or payment input.
    #[error("Invalid deposit input: {0}")]
    Validation(String),

    /// Caller may not manage policies.
    #[error("Only managers and admins may manage deposit policies")]
    NotPermitted,

    /// Policy name taken within the tenant.
    #[error("Deposit policy named {0:?} already exists")]
    DuplicatePolicyName(String),

    /// Stay missing or foreign.
    #[error("Stay not found: {0}")]
    StayNotFound(StayId),

    /// Deposits are only taken for confirmed or in-house stays.
    #[error("Stay {0} does not accept deposits in its current status")]
    StayNotActive(StayId),

    /// Deposit payment missing or foreign.
    #[error("Deposit payment not found: {0}")]
    PaymentNotFound(DepositPaymentId),

    /// Refund larger than what is still held.
    #[error("Refund of {requested} exceeds the {held} still held")]
    RefundExceedsHeld {
        /// Requested refund.
        requested: Decimal,
        /// Amount still held.
        held: Decimal,
    },

    /// Payment changed underneath us too many times.
    #[error("Deposit payment {0} is being modified concurrently, please retry")]
    ConcurrentModification(DepositPaymentId),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DepositError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "INVALID_DEPOSIT_INPUT",
            Self::NotPermitted => "INSUFFICIENT_ROLE",
            Self::DuplicatePolicyName(_) => "DUPLICATE_POLICY_NAME",
            Self::StayNotFound(_) => "STAY_NOT_FOUND",
            Self::StayNotActive(_) => "STAY_NOT_ACTIVE",
            Self::PaymentNotFound(_) => "DEPOSIT_PAYMENT_NOT_FOUND",
            Self::RefundExceedsHeld { .. } => "REFUND_EXCEEDS_HELD",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Repository(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::RefundExceedsHeld { .. } => 400,
            Self::NotPermitted => 403,
            Self::StayNotFound(_) | Self::PaymentNotFound(_) => 404,
            Self::DuplicatePolicyName(_) | Self::StayNotActive(_) | Self::ConcurrentModification(_) => 409,
            Self::Repository(e) => e.http_status_code(),
        }
    }
}

impl From<DepositError> for AppError {
    fn from(err: DepositError) -> Self {
        match err {
            DepositError::Repository(e) => e.into(),
            other => crate::error::classify(other.http_status_code(), other.to_string()),
        }
    }
}
