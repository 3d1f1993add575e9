use async_trait::async_trait;
use innkeep_core::booking::Stay;
use innkeep_core::repository::{RepoResult, RepositoryError, RoomStays, StayQuery, StayRepository, StayWrite};
use innkeep_shared::types::{RoomId, StayId, TenantId};

use super::DocumentStore;

#[async_trait]
impl StayRepository for DocumentStore {
    async fn get(&self, tenant_id: TenantId, stay_id: StayId) -> RepoResult<Option<Stay>> {
        Ok(self.partition(tenant_id).await.stays.get(&stay_id).cloned())
    }

    async fn list_for_room(&self, tenant_id: TenantId, room_id: RoomId) -> RepoResult<RoomStays> {
        let part = self.partition(tenant_id).await;
        Ok(RoomStays {
            stays: part.stays.values().filter(|s| s.room_id == room_id).cloned().collect(),
            version: part.room_versions.get(&room_id).copied().unwrap_or(0),
        })
    }

    async fn list(&self, tenant_id: TenantId, query: &StayQuery) -> RepoResult<Vec<Stay>> {
        let part = self.partition(tenant_id).await;
        let mut stays: Vec<Stay> = part
            .stays
            .values()
            .filter(|s| query.room_ids.as_ref().is_none_or(|ids| ids.contains(&s.room_id)))
            .filter(|s| query.category_id.is_none_or(|c| s.category_id == c))
            .filter(|s| query.statuses.is_empty() || query.statuses.contains(&s.status))
            .cloned()
            .collect();
        stays.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(stays)
    }

    async fn commit(&self, write: StayWrite) -> RepoResult<Stay> {
        let StayWrite {
            mut stay,
            expected_version,
            room_guards,
        } = write;
        let mut part = self.partition(stay.tenant_id).await;

        for guard in &room_guards {
            let current = part.room_versions.get(&guard.room_id).copied().unwrap_or(0);
            if current != guard.version {
                return Err(RepositoryError::version_conflict("room", guard.room_id));
            }
        }

        stay.version = match expected_version {
            None => {
                if part.stays.contains_key(&stay.id) {
                    return Err(RepositoryError::already_exists("stay", stay.id));
                }
                1
            }
            Some(expected) => {
                let current = part
                    .stays
                    .get(&stay.id)
                    .ok_or_else(|| RepositoryError::not_found("stay", stay.id))?;
                if current.version != expected {
                    return Err(RepositoryError::version_conflict("stay", stay.id));
                }
                expected + 1
            }
        };

        for guard in &room_guards {
            *part.room_versions.entry(guard.room_id).or_insert(0) += 1;
        }
        part.stays.insert(stay.id, stay.clone());
        Ok(stay)
    }
}
