//! API route definitions.

use axum::{Router, middleware};
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::{AppState, middleware::auth_middleware};

pub mod availability;
pub mod deposits;
pub mod folios;
pub mod health;
pub mod night_audit;
pub mod overbooking;
pub mod reservations;

/// Creates the API router: public health check plus the authenticated routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(availability::routes())
        .merge(reservations::routes())
        .merge(folios::routes())
        .merge(deposits::routes())
        .merge(overbooking::routes())
        .merge(night_audit::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// `validator` rule: strictly positive amount.
pub(crate) fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive_amount"))
    }
}

/// `validator` rule: amount of zero or more.
pub(crate) fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::new("non_negative_amount"))
    } else {
        Ok(())
    }
}
