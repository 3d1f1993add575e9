use async_trait::async_trait;
use innkeep_shared::types::{FolioId, StayId, TenantId};

use super::RepoResult;
use crate::folio::{Folio, FolioStatus};

/// Coarse folio query.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolioQuery {
    /// Only folios in this status.
    pub status: Option<FolioStatus>,
}

/// Folio storage. A folio is one document; item and totals change together.
#[async_trait]
pub trait FolioRepository: Send + Sync {
    /// Loads one folio.
    async fn get(&self, tenant_id: TenantId, folio_id: FolioId) -> RepoResult<Option<Folio>>;

    /// Loads the folio of a stay.
    async fn find_by_stay(&self, tenant_id: TenantId, stay_id: StayId) -> RepoResult<Option<Folio>>;

    /// Lists folios.
    async fn list(&self, tenant_id: TenantId, query: FolioQuery) -> RepoResult<Vec<Folio>>;

    /// Inserts a new folio. `AlreadyExists` if the stay already has one.
    async fn insert(&self, folio: Folio) -> RepoResult<Folio>;

    /// Replaces the folio read at `expected_version`.
    async fn update(&self, folio: Folio, expected_version: u64) -> RepoResult<Folio>;
}
