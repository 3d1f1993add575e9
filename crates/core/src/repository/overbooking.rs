use async_trait::async_trait;
use chrono::NaiveDate;
use innkeep_shared::types::{OverbookingAlertId, RoomCategoryId, TenantId};

use super::RepoResult;
use crate::overbooking::{AlertStatus, OverbookingAlert, OverbookingSetting};

/// Coarse alert query.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertQuery {
    /// Only alerts in this status.
    pub status: Option<AlertStatus>,
    /// Only alerts of this category.
    pub category_id: Option<RoomCategoryId>,
}

/// Overbooking settings and alerts.
#[async_trait]
pub trait OverbookingRepository: Send + Sync {
    /// Lists every setting of the tenant (default and per category).
    async fn list_settings(&self, tenant_id: TenantId) -> RepoResult<Vec<OverbookingSetting>>;

    /// Inserts or replaces the setting for its scope.
    async fn upsert_setting(&self, setting: OverbookingSetting) -> RepoResult<OverbookingSetting>;

    /// Finds the unresolved alert of a (category, date), if any.
    async fn find_open_alert(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
        date: NaiveDate,
    ) -> RepoResult<Option<OverbookingAlert>>;

    /// Loads one alert.
    async fn get_alert(
        &self,
        tenant_id: TenantId,
        alert_id: OverbookingAlertId,
    ) -> RepoResult<Option<OverbookingAlert>>;

    /// Lists alerts, newest first.
    async fn list_alerts(&self, tenant_id: TenantId, query: AlertQuery) -> RepoResult<Vec<OverbookingAlert>>;

    /// Inserts an alert. `AlreadyExists` if an open alert exists for the
    /// same (category, date).
    async fn insert_alert(&self, alert: OverbookingAlert) -> RepoResult<OverbookingAlert>;

    /// Replaces the alert read at `expected_version`.
    async fn update_alert(
        &self,
        alert: OverbookingAlert,
        expected_version: u64,
    ) -> RepoResult<OverbookingAlert>;
}
