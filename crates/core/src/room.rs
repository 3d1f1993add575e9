//! Room inventory types: rooms, categories and maintenance blocks.

use chrono::{DateTime, Utc};
use innkeep_shared::types::{RoomBlockId, RoomCategoryId, RoomId, TenantId};
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::extension::ExtensionMap;

/// Housekeeping / occupancy status of a physical room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Vacant and ready to sell.
    Clean,
    /// A guest is in house.
    Occupied,
    /// Vacated and waiting for housekeeping.
    Dirty,
    /// Not sellable (repairs, damage).
    OutOfOrder,
}

impl RoomStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Occupied => "occupied",
            Self::Dirty => "dirty",
            Self::OutOfOrder => "out_of_order",
        }
    }

    /// Returns true when night audit must not overwrite this status with `dirty`.
    #[must_use]
    pub const fn keeps_status_on_departure(self) -> bool {
        matches!(self, Self::Dirty | Self::OutOfOrder)
    }
}

impl std::str::FromStr for RoomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clean" => Ok(Self::Clean),
            "occupied" => Ok(Self::Occupied),
            "dirty" => Ok(Self::Dirty),
            "out_of_order" => Ok(Self::OutOfOrder),
            _ => Err(format!("Unknown room status: {s}")),
        }
    }
}

/// A room type (e.g. "Deluxe King"). Overbooking is measured per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCategory {
    /// Category ID.
    pub id: RoomCategoryId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// Standard guest capacity.
    pub base_capacity: u32,
    /// Optional description.
    pub description: Option<String>,
}

/// A sellable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room ID.
    pub id: RoomId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Room number as printed on the door.
    pub number: String,
    /// Category the room belongs to.
    pub category_id: RoomCategoryId,
    /// Maximum number of guests.
    pub capacity: u32,
    /// Current housekeeping status.
    pub status: RoomStatus,
    /// Tenant-defined attributes (amenities, view, ...).
    pub extensions: ExtensionMap,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// A date range during which a room cannot be sold regardless of overbooking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBlock {
    /// Block ID.
    pub id: RoomBlockId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Blocked room.
    pub room_id: RoomId,
    /// Blocked nights.
    pub dates: DateRange,
    /// Why the room is blocked.
    pub reason: String,
    /// When the block was created.
    pub created_at: DateTime<Utc>,
}

/// One entry of a batched room-status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomStatusChange {
    /// Room to update.
    pub room_id: RoomId,
    /// New status.
    pub status: RoomStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in [
            RoomStatus::Clean,
            RoomStatus::Occupied,
            RoomStatus::Dirty,
            RoomStatus::OutOfOrder,
        ] {
            assert_eq!(RoomStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_departure_keeps_dirty_and_out_of_order() {
        assert!(RoomStatus::Dirty.keeps_status_on_departure());
        assert!(RoomStatus::OutOfOrder.keeps_status_on_departure());
        assert!(!RoomStatus::Occupied.keeps_status_on_departure());
        assert!(!RoomStatus::Clean.keeps_status_on_departure());
    }
}
