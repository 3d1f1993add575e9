//! Availability index service.

use std::sync::Arc;

use chrono::NaiveDate;
use innkeep_shared::types::TenantId;

use super::error::AvailabilityError;
use super::index::build_room_days;
use super::types::{AvailabilityReport, AvailabilityTarget};
use crate::calendar::DateRange;
use crate::repository::{RoomRepository, StayRepository};

/// Answers per-room, per-day availability questions.
pub struct AvailabilityIndex {
    rooms: Arc<dyn RoomRepository>,
    stays: Arc<dyn StayRepository>,
}

impl AvailabilityIndex {
    /// Creates the index over the given stores.
    pub fn new(rooms: Arc<dyn RoomRepository>, stays: Arc<dyn StayRepository>) -> Self {
        Self { rooms, stays }
    }

    /// Resolves the status of every night in `[from, to)` for the target.
    pub async fn query(
        &self,
        tenant_id: TenantId,
        target: AvailabilityTarget,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AvailabilityReport, AvailabilityError> {
        let dates = DateRange::new(from, to)?;

        let rooms = match target {
            AvailabilityTarget::Room(room_id) => vec![
                self.rooms
                    .get_room(tenant_id, room_id)
                    .await?
                    .ok_or(AvailabilityError::RoomNotFound(room_id))?,
            ],
            AvailabilityTarget::Category(category_id) => {
                self.rooms
                    .get_category(tenant_id, category_id)
                    .await?
                    .ok_or(AvailabilityError::CategoryNotFound(category_id))?;
                self.rooms.list_rooms(tenant_id, Some(category_id)).await?
            }
        };

        let mut report = Vec::with_capacity(rooms.len());
        for room in &rooms {
            let stays = self.stays.list_for_room(tenant_id, room.id).await?.stays;
            let blocks = self.rooms.list_blocks(tenant_id, room.id).await?;
            report.push(build_room_days(room, dates, stays, &blocks));
        }
        report.sort_by(|a, b| a.room_number.cmp(&b.room_number));

        tracing::debug!(%tenant_id, %dates, rooms = report.len(), "availability resolved");
        Ok(AvailabilityReport { dates, rooms: report })
    }
}
