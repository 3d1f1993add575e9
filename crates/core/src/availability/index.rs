//! Per-room, per-day status resolution.

use crate::booking::Stay;
use crate::calendar::DateRange;
use crate::room::{Room, RoomBlock, RoomStatus};

use super::filter::PostQueryFilter;
use super::types::{DayStatus, RoomAvailability, RoomDay};

/// Resolves the status of every night of `dates` for one room.
///
/// `stays` may be the room's full, unfiltered history; only active stays
/// take part.
#[must_use]
pub fn build_room_days(room: &Room, dates: DateRange, stays: Vec<Stay>, blocks: &[RoomBlock]) -> RoomAvailability {
    let active = PostQueryFilter::active().apply(stays);
    let out_of_order = room.status == RoomStatus::OutOfOrder;

    let days = dates
        .iter_nights()
        .map(|date| {
            let block = blocks.iter().find(|b| b.dates.contains_night(date));
            let occupants: Vec<&Stay> = active.iter().filter(|s| s.dates.contains_night(date)).collect();
            let arriving = occupants.iter().any(|s| s.dates.start() == date);
            let departing = active.iter().any(|s| s.dates.end() == date);

            let status = if out_of_order || block.is_some() {
                DayStatus::Blocked
            } else if arriving {
                DayStatus::CheckIn
            } else if !occupants.is_empty() {
                DayStatus::Occupied
            } else if departing {
                DayStatus::CheckOut
            } else {
                DayStatus::Available
            };

            RoomDay {
                date,
                status,
                primary_stay: occupants.first().map(|s| s.id),
                stay_ids: occupants.iter().map(|s| s.id).collect(),
                block_id: block.map(|b| b.id),
            }
        })
        .collect();

    RoomAvailability {
        room_id: room.id,
        room_number: room.number.clone(),
        category_id: room.category_id,
        days,
    }
}
