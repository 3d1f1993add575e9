use async_trait::async_trait;
use chrono::{DateTime, Utc};
use innkeep_core::repository::{RepoResult, RepositoryError, RoomRepository};
use innkeep_core::room::{Room, RoomBlock, RoomCategory, RoomStatusChange};
use innkeep_shared::types::{RoomCategoryId, RoomId, TenantId};

use super::DocumentStore;

#[async_trait]
impl RoomRepository for DocumentStore {
    async fn get_room(&self, tenant_id: TenantId, room_id: RoomId) -> RepoResult<Option<Room>> {
        Ok(self.partition(tenant_id).await.rooms.get(&room_id).cloned())
    }

    async fn list_rooms(&self, tenant_id: TenantId, category_id: Option<RoomCategoryId>) -> RepoResult<Vec<Room>> {
        let part = self.partition(tenant_id).await;
        let mut rooms: Vec<Room> = part
            .rooms
            .values()
            .filter(|r| category_id.is_none_or(|c| r.category_id == c))
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(rooms)
    }

    async fn get_category(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
    ) -> RepoResult<Option<RoomCategory>> {
        Ok(self.partition(tenant_id).await.categories.get(&category_id).cloned())
    }

    async fn list_categories(&self, tenant_id: TenantId) -> RepoResult<Vec<RoomCategory>> {
        let part = self.partition(tenant_id).await;
        let mut categories: Vec<RoomCategory> = part.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn list_blocks(&self, tenant_id: TenantId, room_id: RoomId) -> RepoResult<Vec<RoomBlock>> {
        let part = self.partition(tenant_id).await;
        Ok(part.blocks.iter().filter(|b| b.room_id == room_id).cloned().collect())
    }

    async fn set_room_statuses(
        &self,
        tenant_id: TenantId,
        changes: &[RoomStatusChange],
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut part = self.partition(tenant_id).await;
        if let Some(missing) = changes.iter().find(|c| !part.rooms.contains_key(&c.room_id)) {
            return Err(RepositoryError::not_found("room", missing.room_id));
        }
        for change in changes {
            if let Some(room) = part.rooms.get_mut(&change.room_id) {
                room.status = change.status;
                room.updated_at = at;
            }
        }
        Ok(())
    }

    async fn upsert_room(&self, room: Room) -> RepoResult<Room> {
        let mut part = self.partition(room.tenant_id).await;
        if !part.categories.contains_key(&room.category_id) {
            return Err(RepositoryError::not_found("room_category", room.category_id));
        }
        part.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    async fn upsert_category(&self, category: RoomCategory) -> RepoResult<RoomCategory> {
        let mut part = self.partition(category.tenant_id).await;
        part.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn insert_block(&self, block: RoomBlock) -> RepoResult<RoomBlock> {
        let mut part = self.partition(block.tenant_id).await;
        if !part.rooms.contains_key(&block.room_id) {
            return Err(RepositoryError::not_found("room", block.room_id));
        }
        if part.blocks.iter().any(|b| b.id == block.id) {
            return Err(RepositoryError::already_exists("room_block", block.id));
        }
        part.blocks.push(block.clone());
        Ok(block)
    }
}
