//! Folio routes: charges, payments, reversals, close and void.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use innkeep_core::folio::{Charge, ChargeCategory, Folio, NewCharge, NewPayment, Payment, PaymentMethod};
use innkeep_shared::types::{FolioId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{non_negative_amount, positive_amount};
use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser};

/// Creates the folio routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/folios/{folio_id}", get(get_folio))
        .route("/folios/{folio_id}/charges", post(add_charge))
        .route("/folios/{folio_id}/payments", post(record_payment))
        .route("/folios/{folio_id}/payments/{payment_id}/refund", post(refund_payment))
        .route("/folios/{folio_id}/payments/{payment_id}/void", post(void_payment))
        .route("/folios/{folio_id}/close", post(close_folio))
        .route("/folios/{folio_id}/void", post(void_folio))
}

/// A charge line.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChargeRequest {
    /// What the charge is for.
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    /// Revenue category.
    pub category: ChargeCategory,
    /// Price per unit before tax.
    #[validate(custom(function = "non_negative_amount"))]
    pub unit_amount: Decimal,
    /// Number of units.
    #[validate(range(min = 1, max = 10_000))]
    pub quantity: u32,
    /// Tax rate in percent (5 = 5%).
    pub tax_rate: Option<Decimal>,
}

impl From<ChargeRequest> for NewCharge {
    fn from(req: ChargeRequest) -> Self {
        Self {
            description: req.description,
            category: req.category,
            unit_amount: req.unit_amount,
            quantity: req.quantity,
            tax_rate: req.tax_rate,
        }
    }
}

/// A payment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaymentRequest {
    /// Amount received.
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    /// Tender type.
    pub method: PaymentMethod,
    /// External reference (card slip, transfer ID).
    #[validate(length(max = 100))]
    pub reference: Option<String>,
}

impl From<PaymentRequest> for NewPayment {
    fn from(req: PaymentRequest) -> Self {
        Self {
            amount: req.amount,
            method: req.method,
            reference: req.reference,
        }
    }
}

/// Body carrying a mandatory reason.
#[derive(Debug, Deserialize, Validate)]
pub struct ReasonRequest {
    /// Why the action is taken.
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Body of `POST /folios/{id}/close`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CloseFolioRequest {
    /// Close with an unsettled balance. Managers and admins only.
    #[serde(default)]
    pub manager_override: bool,
}

/// A folio with the line just posted.
#[derive(Debug, Serialize)]
pub struct FolioLineResponse<T> {
    /// The folio after the write.
    pub folio: Folio,
    /// The posted or reversed line.
    pub line: T,
}

async fn get_folio(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folio_id): Path<FolioId>,
) -> Result<Json<Folio>, ApiError> {
    let folio = state.services.folios.get(auth.tenant_id(), folio_id).await?;
    Ok(Json(folio))
}

async fn add_charge(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folio_id): Path<FolioId>,
    ValidatedJson(payload): ValidatedJson<ChargeRequest>,
) -> Result<(StatusCode, Json<FolioLineResponse<Charge>>), ApiError> {
    let (folio, line) = state
        .services
        .folios
        .add_charge(auth.tenant_id(), &auth.actor(), folio_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(FolioLineResponse { folio, line })))
}

async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folio_id): Path<FolioId>,
    ValidatedJson(payload): ValidatedJson<PaymentRequest>,
) -> Result<(StatusCode, Json<FolioLineResponse<Payment>>), ApiError> {
    let (folio, line) = state
        .services
        .folios
        .record_payment(auth.tenant_id(), &auth.actor(), folio_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(FolioLineResponse { folio, line })))
}

async fn refund_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((folio_id, payment_id)): Path<(FolioId, PaymentId)>,
    ValidatedJson(payload): ValidatedJson<ReasonRequest>,
) -> Result<Json<FolioLineResponse<Payment>>, ApiError> {
    let (folio, line) = state
        .services
        .folios
        .refund_payment(auth.tenant_id(), &auth.actor(), folio_id, payment_id, &payload.reason)
        .await?;
    Ok(Json(FolioLineResponse { folio, line }))
}

async fn void_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((folio_id, payment_id)): Path<(FolioId, PaymentId)>,
    ValidatedJson(payload): ValidatedJson<ReasonRequest>,
) -> Result<Json<FolioLineResponse<Payment>>, ApiError> {
    let (folio, line) = state
        .services
        .folios
        .void_payment(auth.tenant_id(), &auth.actor(), folio_id, payment_id, &payload.reason)
        .await?;
    Ok(Json(FolioLineResponse { folio, line }))
}

async fn close_folio(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folio_id): Path<FolioId>,
    ValidatedJson(payload): ValidatedJson<CloseFolioRequest>,
) -> Result<Json<Folio>, ApiError> {
    let folio = state
        .services
        .folios
        .close(auth.tenant_id(), &auth.actor(), folio_id, payload.manager_override)
        .await?;
    Ok(Json(folio))
}

async fn void_folio(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folio_id): Path<FolioId>,
    ValidatedJson(payload): ValidatedJson<ReasonRequest>,
) -> Result<Json<Folio>, ApiError> {
    let folio = state
        .services
        .folios
        .void(auth.tenant_id(), &auth.actor(), folio_id, &payload.reason)
        .await?;
    Ok(Json(folio))
}
