//! Overbooking settings, status and alert routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use innkeep_core::overbooking::{AlertStatus, OverbookingAlert, OverbookingSetting, OverbookingSnapshot, SettingInput};
use innkeep_core::repository::AlertQuery;
use innkeep_shared::types::{OverbookingAlertId, RoomCategoryId};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::non_negative_amount;
use crate::{
    AppState,
    error::ApiError,
    extractors::{ValidatedJson, ValidatedQuery},
    middleware::AuthUser,
};

/// Creates the overbooking routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/overbooking/settings", get(list_settings).put(upsert_setting))
        .route("/overbooking/status", get(status))
        .route("/overbooking/alerts", get(list_alerts))
        .route("/overbooking/alerts/{alert_id}/resolve", post(resolve_alert))
}

/// Body of `PUT /overbooking/settings`. Without a category it sets the tenant default.
#[derive(Debug, Deserialize, Validate)]
pub struct SettingRequest {
    /// Category scope.
    pub category_id: Option<RoomCategoryId>,
    /// Whether a room may be sold twice for a night.
    pub allow_overbooking: bool,
    /// Cap on overbooked rooms, percent of the category.
    #[validate(custom(function = "non_negative_amount"))]
    pub max_overbooking_percent: Decimal,
    /// Warning threshold, percent.
    #[validate(custom(function = "non_negative_amount"))]
    pub alert_threshold_percent: Decimal,
    /// Critical threshold, percent.
    #[validate(custom(function = "non_negative_amount"))]
    pub critical_threshold_percent: Decimal,
}

/// Query for `GET /overbooking/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct StatusQuery {
    /// Category to inspect.
    pub category_id: RoomCategoryId,
    /// First night.
    pub from: NaiveDate,
    /// Night after the last one.
    pub to: NaiveDate,
}

/// Query for `GET /overbooking/alerts`.
#[derive(Debug, Deserialize, Validate)]
pub struct AlertsQuery {
    /// Only alerts in this status.
    pub status: Option<AlertStatus>,
    /// Only alerts of this category.
    pub category_id: Option<RoomCategoryId>,
}

/// Body of `POST /overbooking/alerts/{id}/resolve`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveAlertRequest {
    /// How the alert was handled.
    #[validate(length(min = 1, max = 1000))]
    pub notes: String,
}

async fn list_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<OverbookingSetting>>, ApiError> {
    let settings = state.services.overbooking.list_settings(auth.tenant_id()).await?;
    Ok(Json(settings))
}

async fn upsert_setting(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<SettingRequest>,
) -> Result<Json<OverbookingSetting>, ApiError> {
    let input = SettingInput {
        category_id: payload.category_id,
        allow_overbooking: payload.allow_overbooking,
        max_overbooking_percent: payload.max_overbooking_percent,
        alert_threshold_percent: payload.alert_threshold_percent,
        critical_threshold_percent: payload.critical_threshold_percent,
    };
    let setting = state
        .services
        .overbooking
        .upsert_setting(auth.tenant_id(), &auth.actor(), input)
        .await?;
    Ok(Json(setting))
}

async fn status(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<StatusQuery>,
) -> Result<Json<Vec<OverbookingSnapshot>>, ApiError> {
    let snapshots = state
        .services
        .overbooking
        .status(auth.tenant_id(), query.category_id, query.from, query.to)
        .await?;
    Ok(Json(snapshots))
}

async fn list_alerts(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<AlertsQuery>,
) -> Result<Json<Vec<OverbookingAlert>>, ApiError> {
    let alerts = state
        .services
        .overbooking
        .list_alerts(
            auth.tenant_id(),
            AlertQuery {
                status: query.status,
                category_id: query.category_id,
            },
        )
        .await?;
    Ok(Json(alerts))
}

async fn resolve_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(alert_id): Path<OverbookingAlertId>,
    ValidatedJson(payload): ValidatedJson<ResolveAlertRequest>,
) -> Result<Json<OverbookingAlert>, ApiError> {
    let alert = state
        .services
        .overbooking
        .resolve(auth.tenant_id(), &auth.actor(), alert_id, &payload.notes)
        .await?;
    Ok(Json(alert))
}
