//! Availability query results.

use chrono::NaiveDate;
use innkeep_shared::types::{RoomBlockId, RoomCategoryId, RoomId, StayId};
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;

/// What an availability query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityTarget {
    /// One room.
    Room(RoomId),
    /// Every room of a category.
    Category(RoomCategoryId),
}

/// Status of one room on one day, by precedence
/// `blocked > check_in > occupied > check_out > available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Out of order, or covered by a room block.
    Blocked,
    /// A stay starts that day.
    CheckIn,
    /// A stay occupies that night.
    Occupied,
    /// A stay ends that day and none occupies the night.
    CheckOut,
    /// Free to sell.
    Available,
}

impl DayStatus {
    /// Returns true when the night can be sold.
    #[must_use]
    pub const fn is_sellable(self) -> bool {
        matches!(self, Self::Available | Self::CheckOut)
    }
}

/// One room-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDay {
    /// The night.
    pub date: NaiveDate,
    /// Resolved status.
    pub status: DayStatus,
    /// Earliest-created stay occupying the night.
    pub primary_stay: Option<StayId>,
    /// Every stay occupying the night, earliest first.
    pub stay_ids: Vec<StayId>,
    /// Block covering the night.
    pub block_id: Option<RoomBlockId>,
}

/// Day-by-day availability of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAvailability {
    /// Room.
    pub room_id: RoomId,
    /// Room number.
    pub room_number: String,
    /// Room category.
    pub category_id: RoomCategoryId,
    /// One entry per night of the queried range.
    pub days: Vec<RoomDay>,
}

impl RoomAvailability {
    /// Returns true when every night of the range can be sold.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.days.iter().all(|d| d.status.is_sellable())
    }
}

/// Answer to an availability query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    /// Queried range.
    pub dates: DateRange,
    /// One entry per room, ordered by room number.
    pub rooms: Vec<RoomAvailability>,
}
