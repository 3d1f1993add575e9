//! Error responses.
//!
//! Every failure leaves a handler as `{"error": CODE, "message": ...}` with
//! the status of the shared [`AppError`] taxonomy. Server-side failures are
//! logged and answered with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use innkeep_core::availability::AvailabilityError;
use innkeep_core::booking::BookingError;
use innkeep_core::deposit::DepositError;
use innkeep_core::folio::FolioError;
use innkeep_core::night_audit::AuditError;
use innkeep_core::overbooking::OverbookingError;
use innkeep_shared::AppError;
use serde_json::json;
use tracing::error;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// An error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Malformed or invalid request input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    /// Missing or rejected credentials.
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code,
            message: message.into(),
        }
    }

    /// Returns the response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn classified(app: AppError, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(app.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if app.is_server_error() {
            error!(code, error = %message, "request failed");
            return Self {
                status,
                code,
                message: INTERNAL_MESSAGE.to_string(),
            };
        }
        Self { status, code, message }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let message = err.to_string();
        let code = err.error_code();
        Self::classified(err, code, message)
    }
}

macro_rules! from_domain_error {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    let code = err.error_code();
                    let message = err.to_string();
                    Self::classified(AppError::from(err), code, message)
                }
            }
        )+
    };
}

from_domain_error!(
    AvailabilityError,
    BookingError,
    DepositError,
    FolioError,
    OverbookingError,
    AuditError,
);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}
