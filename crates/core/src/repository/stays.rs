use async_trait::async_trait;
use innkeep_shared::types::{RoomCategoryId, RoomId, StayId, TenantId};

use super::RepoResult;
use crate::booking::{Stay, StayStatus};

/// All stays of one room plus the room's booking version.
///
/// The version changes whenever a stay is committed with a guard on the room,
/// so a commit guarded by this version proves nothing was booked in between.
#[derive(Debug, Clone, Default)]
pub struct RoomStays {
    /// Every stay ever assigned to the room, in any status.
    pub stays: Vec<Stay>,
    /// Booking version of the room (0 when nothing was ever booked).
    pub version: u64,
}

/// Expected booking version of one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomGuard {
    /// Guarded room.
    pub room_id: RoomId,
    /// Version read by the caller.
    pub version: u64,
}

/// A conditional stay write.
#[derive(Debug, Clone)]
pub struct StayWrite {
    /// The stay to store.
    pub stay: Stay,
    /// `None` inserts a new stay; `Some(v)` replaces the stay read at version `v`.
    pub expected_version: Option<u64>,
    /// Rooms whose booking version must still match. Each guarded room's
    /// version is bumped on success.
    pub room_guards: Vec<RoomGuard>,
}

/// Coarse stay query.
#[derive(Debug, Clone, Default)]
pub struct StayQuery {
    /// Only stays in these rooms (all when `None`).
    pub room_ids: Option<Vec<RoomId>>,
    /// Only stays of this category.
    pub category_id: Option<RoomCategoryId>,
    /// Only stays in these statuses (all when empty).
    pub statuses: Vec<StayStatus>,
}

impl StayQuery {
    /// Active stays of one category.
    #[must_use]
    pub fn active_in_category(category_id: RoomCategoryId) -> Self {
        Self {
            room_ids: None,
            category_id: Some(category_id),
            statuses: StayStatus::ACTIVE.to_vec(),
        }
    }
}

/// Stay (reservation) storage.
#[async_trait]
pub trait StayRepository: Send + Sync {
    /// Loads one stay.
    async fn get(&self, tenant_id: TenantId, stay_id: StayId) -> RepoResult<Option<Stay>>;

    /// Loads every stay of a room together with the room's booking version.
    async fn list_for_room(&self, tenant_id: TenantId, room_id: RoomId) -> RepoResult<RoomStays>;

    /// Coarse listing.
    async fn list(&self, tenant_id: TenantId, query: &StayQuery) -> RepoResult<Vec<Stay>>;

    /// Writes the stay if the stay version and every guarded room version
    /// still match; returns the stored stay.
    async fn commit(&self, write: StayWrite) -> RepoResult<Stay>;
}
