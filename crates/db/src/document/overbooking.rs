use async_trait::async_trait;
use chrono::NaiveDate;
use innkeep_core::overbooking::{OverbookingAlert, OverbookingSetting};
use innkeep_core::repository::{AlertQuery, OverbookingRepository, RepoResult, RepositoryError};
use innkeep_shared::types::{OverbookingAlertId, RoomCategoryId, TenantId};

use super::DocumentStore;

#[async_trait]
impl OverbookingRepository for DocumentStore {
    async fn list_settings(&self, tenant_id: TenantId) -> RepoResult<Vec<OverbookingSetting>> {
        Ok(self.partition(tenant_id).await.overbooking_settings.clone())
    }

    async fn upsert_setting(&self, setting: OverbookingSetting) -> RepoResult<OverbookingSetting> {
        let mut part = self.partition(setting.tenant_id).await;
        part.overbooking_settings.retain(|s| s.category_id != setting.category_id);
        part.overbooking_settings.push(setting.clone());
        Ok(setting)
    }

    async fn find_open_alert(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
        date: NaiveDate,
    ) -> RepoResult<Option<OverbookingAlert>> {
        let part = self.partition(tenant_id).await;
        Ok(part
            .overbooking_alerts
            .values()
            .find(|a| a.is_open() && a.category_id == category_id && a.date == date)
            .cloned())
    }

    async fn get_alert(
        &self,
        tenant_id: TenantId,
        alert_id: OverbookingAlertId,
    ) -> RepoResult<Option<OverbookingAlert>> {
        Ok(self.partition(tenant_id).await.overbooking_alerts.get(&alert_id).cloned())
    }

    async fn list_alerts(&self, tenant_id: TenantId, query: AlertQuery) -> RepoResult<Vec<OverbookingAlert>> {
        let part = self.partition(tenant_id).await;
        let mut alerts: Vec<OverbookingAlert> = part
            .overbooking_alerts
            .values()
            .filter(|a| query.status.is_none_or(|s| a.status == s))
            .filter(|a| query.category_id.is_none_or(|c| a.category_id == c))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.raised_at.cmp(&a.raised_at).then(b.id.cmp(&a.id)));
        Ok(alerts)
    }

    async fn insert_alert(&self, mut alert: OverbookingAlert) -> RepoResult<OverbookingAlert> {
        let mut part = self.partition(alert.tenant_id).await;
        let duplicate = part
            .overbooking_alerts
            .values()
            .any(|a| a.is_open() && a.category_id == alert.category_id && a.date == alert.date);
        if duplicate {
            return Err(RepositoryError::already_exists(
                "overbooking_alert",
                format!("{}/{}", alert.category_id, alert.date),
            ));
        }
        alert.version = 1;
        part.overbooking_alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    async fn update_alert(&self, mut alert: OverbookingAlert, expected_version: u64) -> RepoResult<OverbookingAlert> {
        let mut part = self.partition(alert.tenant_id).await;
        let current = part
            .overbooking_alerts
            .get(&alert.id)
            .ok_or_else(|| RepositoryError::not_found("overbooking_alert", alert.id))?;
        if current.version != expected_version {
            return Err(RepositoryError::version_conflict("overbooking_alert", alert.id));
        }
        alert.version = expected_version + 1;
        part.overbooking_alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }
}
