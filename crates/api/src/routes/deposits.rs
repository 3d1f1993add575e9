//! Deposit policy, quote and refund routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use innkeep_core::calendar::DateRange;
use innkeep_core::deposit::{DepositContext, DepositPayment, DepositPolicy, DepositQuote, DepositType, NewDepositPolicy};
use innkeep_shared::types::{DepositPaymentId, RatePlanId, RoomCategoryId};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::{non_negative_amount, positive_amount};
use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser};

/// Creates the deposit routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deposit-policies", get(list_policies).post(create_policy))
        .route("/deposits/calculate", post(calculate))
        .route("/deposit-payments/{payment_id}/refund", post(refund_payment))
}

/// Body of `POST /deposit-policies`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePolicyRequest {
    /// Unique name within the tenant.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Category scope.
    pub category_id: Option<RoomCategoryId>,
    /// Rate plan scope.
    pub rate_plan_id: Option<RatePlanId>,
    /// Tenant-wide fallback.
    #[serde(default)]
    pub applies_to_all_rooms: bool,
    /// How the amount is computed.
    pub deposit_type: DepositType,
    /// Percent, fixed amount or night count, depending on the type.
    #[validate(custom(function = "non_negative_amount"))]
    pub value: Decimal,
    /// Amount for the custom type.
    pub custom_amount: Option<Decimal>,
    /// Lower clamp.
    pub min_deposit_amount: Option<Decimal>,
    /// Upper clamp.
    pub max_deposit_amount: Option<Decimal>,
    /// Required when the stay covers a Friday or Saturday night.
    #[serde(default)]
    pub requires_for_weekends: bool,
    /// Required when the stay covers a listed holiday.
    #[serde(default)]
    pub requires_for_holidays: bool,
    /// Required in peak season.
    #[serde(default)]
    pub requires_for_peak_season: bool,
    /// Higher wins among policies of the same scope.
    #[serde(default)]
    pub priority: i32,
    /// Inactive policies are never selected.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl From<CreatePolicyRequest> for NewDepositPolicy {
    fn from(req: CreatePolicyRequest) -> Self {
        Self {
            name: req.name,
            category_id: req.category_id,
            rate_plan_id: req.rate_plan_id,
            applies_to_all_rooms: req.applies_to_all_rooms,
            deposit_type: req.deposit_type,
            value: req.value,
            custom_amount: req.custom_amount,
            min_deposit_amount: req.min_deposit_amount,
            max_deposit_amount: req.max_deposit_amount,
            requires_for_weekends: req.requires_for_weekends,
            requires_for_holidays: req.requires_for_holidays,
            requires_for_peak_season: req.requires_for_peak_season,
            priority: req.priority,
            is_active: req.is_active,
        }
    }
}

/// Body of `POST /deposits/calculate`.
#[derive(Debug, Deserialize, Validate)]
pub struct CalculateDepositRequest {
    /// Category of the room.
    pub category_id: RoomCategoryId,
    /// Rate plan, if any.
    pub rate_plan_id: Option<RatePlanId>,
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date.
    pub check_out: NaiveDate,
    /// Total room rate.
    #[validate(custom(function = "non_negative_amount"))]
    pub total_rate: Decimal,
    /// Holiday dates.
    #[serde(default)]
    #[validate(length(max = 366))]
    pub holidays: Vec<NaiveDate>,
    /// Whether the stay falls in peak season.
    #[serde(default)]
    pub peak_season: bool,
}

/// Body of `POST /deposit-payments/{id}/refund`.
#[derive(Debug, Deserialize, Validate)]
pub struct RefundDepositRequest {
    /// Amount to give back.
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    /// Why.
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

async fn list_policies(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<DepositPolicy>>, ApiError> {
    let policies = state.services.deposits.list_policies(auth.tenant_id()).await?;
    Ok(Json(policies))
}

async fn create_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreatePolicyRequest>,
) -> Result<(StatusCode, Json<DepositPolicy>), ApiError> {
    let policy = state
        .services
        .deposits
        .create_policy(auth.tenant_id(), &auth.actor(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

async fn calculate(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CalculateDepositRequest>,
) -> Result<Json<DepositQuote>, ApiError> {
    let dates =
        DateRange::new(payload.check_in, payload.check_out).map_err(|e| ApiError::validation(e.to_string()))?;
    let ctx = DepositContext {
        category_id: payload.category_id,
        rate_plan_id: payload.rate_plan_id,
        dates,
        total_rate: payload.total_rate,
        holidays: payload.holidays,
        peak_season: payload.peak_season,
    };
    let quote = state.services.deposits.quote(auth.tenant_id(), &ctx).await?;
    Ok(Json(quote))
}

async fn refund_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<DepositPaymentId>,
    ValidatedJson(payload): ValidatedJson<RefundDepositRequest>,
) -> Result<Json<DepositPayment>, ApiError> {
    let payment = state
        .services
        .deposits
        .refund_payment(auth.tenant_id(), payment_id, payload.amount, &payload.reason)
        .await?;
    Ok(Json(payment))
}
