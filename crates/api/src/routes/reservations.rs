//! Reservation routes: booking lifecycle, the stay's folio and deposits.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use innkeep_core::booking::{CheckOutInput, CreateStayInput, GuestInfo, MoveStayInput, Stay, StayFilter, StayStatus};
use innkeep_core::calendar::DateRange;
use innkeep_core::deposit::{DepositPayment, DepositSummary};
use innkeep_core::extension::ExtensionMap;
use innkeep_core::folio::Folio;
use innkeep_shared::AppError;
use innkeep_shared::types::{PageRequest, PageResponse, RatePlanId, RoomId, StayId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::folios::{ChargeRequest, PaymentRequest, ReasonRequest};
use super::non_negative_amount;
use crate::{
    AppState,
    error::ApiError,
    extractors::{ValidatedJson, ValidatedQuery},
    middleware::AuthUser,
};

/// Creates the reservation routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/{stay_id}", get(get_reservation))
        .route("/reservations/{stay_id}/move", post(move_reservation))
        .route("/reservations/{stay_id}/check-in", post(check_in))
        .route("/reservations/{stay_id}/check-out", post(check_out))
        .route("/reservations/{stay_id}/cancel", post(cancel))
        .route("/reservations/{stay_id}/no-show", post(no_show))
        .route("/reservations/{stay_id}/folio", get(get_stay_folio))
        .route(
            "/reservations/{stay_id}/deposit-payments",
            get(list_deposit_payments).post(record_deposit_payment),
        )
}

/// Guest details.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GuestRequest {
    /// Full name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// Contact phone.
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    /// Adults in the party.
    #[validate(range(min = 1, max = 20))]
    pub adults: u32,
    /// Children in the party.
    #[serde(default)]
    #[validate(range(max = 20))]
    pub children: u32,
}

impl From<GuestRequest> for GuestInfo {
    fn from(req: GuestRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
            adults: req.adults,
            children: req.children,
        }
    }
}

/// Body of `POST /reservations`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    /// Room to book.
    pub room_id: RoomId,
    /// Who is staying.
    #[validate(nested)]
    pub guest: GuestRequest,
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date.
    pub check_out: NaiveDate,
    /// Total room rate for the stay.
    #[validate(custom(function = "non_negative_amount"))]
    pub total_rate: Decimal,
    /// Rate plan, if any.
    pub rate_plan_id: Option<RatePlanId>,
    /// Holiday dates that may trigger a deposit.
    #[serde(default)]
    #[validate(length(max = 366))]
    pub holidays: Vec<NaiveDate>,
    /// Whether the stay falls in peak season.
    #[serde(default)]
    pub peak_season: bool,
    /// Tenant-specific fields.
    #[serde(default)]
    pub extensions: ExtensionMap,
}

/// Body of `POST /reservations/{id}/move`.
#[derive(Debug, Deserialize, Validate)]
pub struct MoveReservationRequest {
    /// Target room.
    pub room_id: RoomId,
    /// New arrival date.
    pub check_in: NaiveDate,
    /// New departure date.
    pub check_out: NaiveDate,
}

/// Body of `POST /reservations/{id}/check-out`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CheckOutRequest {
    /// Charges posted at departure.
    #[serde(default)]
    #[validate(nested, length(max = 50))]
    pub final_charges: Vec<ChargeRequest>,
    /// Settling payment.
    #[validate(nested)]
    pub payment: Option<PaymentRequest>,
    /// Depart with an unsettled balance. Managers and admins only.
    #[serde(default)]
    pub manager_override: bool,
}

/// Query for `GET /reservations`.
#[derive(Debug, Deserialize, Validate)]
pub struct ListReservationsQuery {
    /// Only stays in this status.
    pub status: Option<StayStatus>,
    /// Only stays in this room.
    pub room_id: Option<RoomId>,
    /// With `to`: only stays overlapping `[from, to)`.
    pub from: Option<NaiveDate>,
    /// With `from`: only stays overlapping `[from, to)`.
    pub to: Option<NaiveDate>,
    /// Page number, 1-indexed.
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    /// Items per page.
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 200))]
    pub per_page: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    50
}

impl ListReservationsQuery {
    const fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            per_page: self.per_page,
        }
    }

    fn into_filter(self) -> Result<StayFilter, ApiError> {
        let overlapping = match (self.from, self.to) {
            (Some(from), Some(to)) => {
                Some(DateRange::new(from, to).map_err(|e| ApiError::validation(e.to_string()))?)
            }
            (None, None) => None,
            _ => return Err(ApiError::validation("from and to must be given together")),
        };
        Ok(StayFilter {
            statuses: self.status.into_iter().collect(),
            room_id: self.room_id,
            overlapping,
        })
    }
}

/// Deposit standing of a stay.
#[derive(Debug, Serialize)]
pub struct DepositPaymentsResponse {
    /// Quoted vs paid.
    pub summary: DepositSummary,
    /// Individual payments.
    pub payments: Vec<DepositPayment>,
}

async fn list_reservations(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<ListReservationsQuery>,
) -> Result<Json<PageResponse<Stay>>, ApiError> {
    let page = query.page_request();
    let filter = query.into_filter()?;
    let stays = state.services.bookings.list(auth.tenant_id(), &filter).await?;
    Ok(Json(page.paginate(stays)))
}

async fn create_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Stay>), ApiError> {
    let input = CreateStayInput {
        room_id: payload.room_id,
        guest: payload.guest.into(),
        check_in: payload.check_in,
        check_out: payload.check_out,
        total_rate: payload.total_rate,
        rate_plan_id: payload.rate_plan_id,
        holidays: payload.holidays,
        peak_season: payload.peak_season,
        extensions: payload.extensions,
    };
    let stay = state
        .services
        .bookings
        .create(auth.tenant_id(), &auth.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(stay)))
}

async fn get_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(stay_id): Path<StayId>,
) -> Result<Json<Stay>, ApiError> {
    let stay = state.services.bookings.get(auth.tenant_id(), stay_id).await?;
    Ok(Json(stay))
}

async fn move_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(stay_id): Path<StayId>,
    ValidatedJson(payload): ValidatedJson<MoveReservationRequest>,
) -> Result<Json<Stay>, ApiError> {
    let input = MoveStayInput {
        room_id: payload.room_id,
        check_in: payload.check_in,
        check_out: payload.check_out,
    };
    let stay = state
        .services
        .bookings
        .move_stay(auth.tenant_id(), stay_id, input)
        .await?;
    Ok(Json(stay))
}

async fn check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(stay_id): Path<StayId>,
) -> Result<Json<Stay>, ApiError> {
    let stay = state
        .services
        .bookings
        .check_in(auth.tenant_id(), &auth.actor(), stay_id)
        .await?;
    Ok(Json(stay))
}

async fn check_out(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(stay_id): Path<StayId>,
    ValidatedJson(payload): ValidatedJson<CheckOutRequest>,
) -> Result<Json<Stay>, ApiError> {
    let input = CheckOutInput {
        final_charges: payload.final_charges.into_iter().map(Into::into).collect(),
        payment: payload.payment.map(Into::into),
        manager_override: payload.manager_override,
    };
    let stay = state
        .services
        .bookings
        .check_out(auth.tenant_id(), &auth.actor(), stay_id, input)
        .await?;
    Ok(Json(stay))
}

async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(stay_id): Path<StayId>,
    ValidatedJson(payload): ValidatedJson<ReasonRequest>,
) -> Result<Json<Stay>, ApiError> {
    let stay = state
        .services
        .bookings
        .cancel(auth.tenant_id(), stay_id, &payload.reason)
        .await?;
    Ok(Json(stay))
}

async fn no_show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(stay_id): Path<StayId>,
) -> Result<Json<Stay>, ApiError> {
    let stay = state.services.bookings.mark_no_show(auth.tenant_id(), stay_id).await?;
    Ok(Json(stay))
}

async fn get_stay_folio(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(stay_id): Path<StayId>,
) -> Result<Json<Folio>, ApiError> {
    let tenant_id = auth.tenant_id();
    // Ownership check first so a foreign stay reads as missing.
    state.services.bookings.get(tenant_id, stay_id).await?;
    let folio = state
        .services
        .folios
        .find_by_stay(tenant_id, stay_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("stay {stay_id} has no folio")))?;
    Ok(Json(folio))
}

async fn list_deposit_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(stay_id): Path<StayId>,
) -> Result<Json<DepositPaymentsResponse>, ApiError> {
    let tenant_id = auth.tenant_id();
    let summary = state.services.deposits.summary(tenant_id, stay_id).await?;
    let payments = state.services.deposits.list_payments(tenant_id, stay_id).await?;
    Ok(Json(DepositPaymentsResponse { summary, payments }))
}

async fn record_deposit_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(stay_id): Path<StayId>,
    ValidatedJson(payload): ValidatedJson<PaymentRequest>,
) -> Result<(StatusCode, Json<DepositPayment>), ApiError> {
    let payment = state
        .services
        .deposits
        .record_payment(auth.tenant_id(), &auth.actor(), stay_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
