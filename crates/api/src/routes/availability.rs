//! Availability grid routes.

use axum::{Json, Router, extract::State, routing::get};
use chrono::NaiveDate;
use innkeep_core::availability::{AvailabilityReport, AvailabilityTarget};
use innkeep_shared::types::{RoomCategoryId, RoomId};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, extractors::ValidatedQuery, middleware::AuthUser};

/// Creates the availability routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/availability", get(query_availability))
}

/// Query for `GET /availability`. Exactly one of `room_id` and `category_id`.
#[derive(Debug, Deserialize, Validate)]
pub struct AvailabilityQuery {
    /// One room.
    pub room_id: Option<RoomId>,
    /// Every room of a category.
    pub category_id: Option<RoomCategoryId>,
    /// First night.
    pub from: NaiveDate,
    /// Night after the last one.
    pub to: NaiveDate,
}

impl AvailabilityQuery {
    fn target(&self) -> Result<AvailabilityTarget, ApiError> {
        match (self.room_id, self.category_id) {
            (Some(room_id), None) => Ok(AvailabilityTarget::Room(room_id)),
            (None, Some(category_id)) => Ok(AvailabilityTarget::Category(category_id)),
            _ => Err(ApiError::validation("exactly one of room_id and category_id is required")),
        }
    }
}

async fn query_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<AvailabilityQuery>,
) -> Result<Json<AvailabilityReport>, ApiError> {
    let target = query.target()?;
    let report = state
        .services
        .availability
        .query(auth.tenant_id(), target, query.from, query.to)
        .await?;
    Ok(Json(report))
}
