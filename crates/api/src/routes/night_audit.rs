//! Night audit routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use innkeep_core::night_audit::NightAuditRecord;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState,
    error::ApiError,
    extractors::{ValidatedJson, ValidatedQuery},
    middleware::AuthUser,
};

/// Creates the night audit routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/night-audit", get(list_records).post(run_audit))
        .route("/night-audit/{audit_date}", get(get_record))
}

/// Body of `POST /night-audit`.
#[derive(Debug, Deserialize, Validate)]
pub struct RunAuditRequest {
    /// Business day to close.
    pub date: NaiveDate,
}

/// Query for `GET /night-audit`.
#[derive(Debug, Deserialize, Validate)]
pub struct ListRecordsQuery {
    /// First audited day.
    pub from: NaiveDate,
    /// Day after the last one.
    pub to: NaiveDate,
}

async fn run_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<RunAuditRequest>,
) -> Result<(StatusCode, Json<NightAuditRecord>), ApiError> {
    let record = state
        .services
        .night_audit
        .run_for_tenant(auth.tenant_id(), payload.date, &auth.actor())
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(audit_date): Path<NaiveDate>,
) -> Result<Json<NightAuditRecord>, ApiError> {
    let record = state
        .services
        .night_audit
        .get_record(auth.tenant_id(), audit_date)
        .await?;
    Ok(Json(record))
}

async fn list_records(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<ListRecordsQuery>,
) -> Result<Json<Vec<NightAuditRecord>>, ApiError> {
    let records = state
        .services
        .night_audit
        .list_records(auth.tenant_id(), query.from, query.to)
        .await?;
    Ok(Json(records))
}
