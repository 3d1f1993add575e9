use async_trait::async_trait;
use chrono::{DateTime, Utc};
use innkeep_shared::types::{RoomCategoryId, RoomId, TenantId};

use super::RepoResult;
use crate::room::{Room, RoomBlock, RoomCategory, RoomStatusChange};

/// Rooms, categories and maintenance blocks.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Loads one room.
    async fn get_room(&self, tenant_id: TenantId, room_id: RoomId) -> RepoResult<Option<Room>>;

    /// Lists rooms, optionally restricted to one category, ordered by number.
    async fn list_rooms(
        &self,
        tenant_id: TenantId,
        category_id: Option<RoomCategoryId>,
    ) -> RepoResult<Vec<Room>>;

    /// Loads one category.
    async fn get_category(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
    ) -> RepoResult<Option<RoomCategory>>;

    /// Lists all categories.
    async fn list_categories(&self, tenant_id: TenantId) -> RepoResult<Vec<RoomCategory>>;

    /// Lists every block of a room.
    async fn list_blocks(&self, tenant_id: TenantId, room_id: RoomId) -> RepoResult<Vec<RoomBlock>>;

    /// Applies all status changes or none of them, stamping each room's
    /// `updated_at` with `at`. Unknown rooms fail the batch.
    async fn set_room_statuses(
        &self,
        tenant_id: TenantId,
        changes: &[RoomStatusChange],
        at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Inserts or replaces a room.
    async fn upsert_room(&self, room: Room) -> RepoResult<Room>;

    /// Inserts or replaces a category.
    async fn upsert_category(&self, category: RoomCategory) -> RepoResult<RoomCategory>;

    /// Inserts a block.
    async fn insert_block(&self, block: RoomBlock) -> RepoResult<RoomBlock>;
}
