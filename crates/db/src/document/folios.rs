use async_trait::async_trait;
use innkeep_core::folio::Folio;
use innkeep_core::repository::{FolioQuery, FolioRepository, RepoResult, RepositoryError};
use innkeep_shared::types::{FolioId, StayId, TenantId};

use super::DocumentStore;

#[async_trait]
impl FolioRepository for DocumentStore {
    async fn get(&self, tenant_id: TenantId, folio_id: FolioId) -> RepoResult<Option<Folio>> {
        Ok(self.partition(tenant_id).await.folios.get(&folio_id).cloned())
    }

    async fn find_by_stay(&self, tenant_id: TenantId, stay_id: StayId) -> RepoResult<Option<Folio>> {
        let part = self.partition(tenant_id).await;
        Ok(part.folios.values().find(|f| f.stay_id == stay_id).cloned())
    }

    async fn list(&self, tenant_id: TenantId, query: FolioQuery) -> RepoResult<Vec<Folio>> {
        let part = self.partition(tenant_id).await;
        let mut folios: Vec<Folio> = part
            .folios
            .values()
            .filter(|f| query.status.is_none_or(|s| f.status == s))
            .cloned()
            .collect();
        folios.sort_by(|a, b| a.opened_at.cmp(&b.opened_at).then(a.id.cmp(&b.id)));
        Ok(folios)
    }

    async fn insert(&self, mut folio: Folio) -> RepoResult<Folio> {
        let mut part = self.partition(folio.tenant_id).await;
        if part.folios.contains_key(&folio.id) || part.folios.values().any(|f| f.stay_id == folio.stay_id) {
            return Err(RepositoryError::already_exists("folio", folio.stay_id));
        }
        folio.version = 1;
        part.folios.insert(folio.id, folio.clone());
        Ok(folio)
    }

    async fn update(&self, mut folio: Folio, expected_version: u64) -> RepoResult<Folio> {
        let mut part = self.partition(folio.tenant_id).await;
        let current = part
            .folios
            .get(&folio.id)
            .ok_or_else(|| RepositoryError::not_found("folio", folio.id))?;
        if current.version != expected_version {
            return Err(RepositoryError::version_conflict("folio", folio.id));
        }
        folio.version = expected_version + 1;
        part.folios.insert(folio.id, folio.clone());
        Ok(folio)
    }
}
