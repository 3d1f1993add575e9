use async_trait::async_trait;
use chrono::NaiveDate;
use innkeep_core::calendar::DateRange;
use innkeep_core::night_audit::{NightAuditRecord, SmartAlert};
use innkeep_core::repository::{
    NightAuditRepository, RepoResult, RepositoryError, ShiftRepository, SmartAlertRepository,
};
use innkeep_core::shift::{Shift, ShiftStatus};
use innkeep_shared::types::TenantId;
use uuid::Uuid;

use super::{AuditSlot, DocumentStore};

#[async_trait]
impl NightAuditRepository for DocumentStore {
    async fn get(&self, tenant_id: TenantId, audit_date: NaiveDate) -> RepoResult<Option<NightAuditRecord>> {
        let part = self.partition(tenant_id).await;
        Ok(match part.audits.get(&audit_date) {
            Some(AuditSlot::Completed(record)) => Some(record.as_ref().clone()),
            _ => None,
        })
    }

    async fn list(&self, tenant_id: TenantId, range: DateRange) -> RepoResult<Vec<NightAuditRecord>> {
        let part = self.partition(tenant_id).await;
        Ok(part
            .audits
            .range(range.start()..range.end())
            .filter_map(|(_, slot)| match slot {
                AuditSlot::Completed(record) => Some(record.as_ref().clone()),
                AuditSlot::Claimed(_) => None,
            })
            .collect())
    }

    async fn claim(&self, tenant_id: TenantId, audit_date: NaiveDate, run_id: Uuid) -> RepoResult<()> {
        let mut part = self.partition(tenant_id).await;
        if part.audits.contains_key(&audit_date) {
            return Err(RepositoryError::already_exists("night_audit", audit_date));
        }
        part.audits.insert(audit_date, AuditSlot::Claimed(run_id));
        Ok(())
    }

    async fn release(&self, tenant_id: TenantId, audit_date: NaiveDate, run_id: Uuid) -> RepoResult<()> {
        let mut part = self.partition(tenant_id).await;
        if matches!(part.audits.get(&audit_date), Some(AuditSlot::Claimed(held)) if *held == run_id) {
            part.audits.remove(&audit_date);
        }
        Ok(())
    }

    async fn complete(&self, record: NightAuditRecord) -> RepoResult<NightAuditRecord> {
        let mut part = self.partition(record.tenant_id).await;
        match part.audits.get(&record.audit_date) {
            Some(AuditSlot::Claimed(held)) if *held == record.run_id => {}
            Some(_) => return Err(RepositoryError::version_conflict("night_audit", record.audit_date)),
            None => return Err(RepositoryError::not_found("night_audit_claim", record.audit_date)),
        }
        part.audits
            .insert(record.audit_date, AuditSlot::Completed(Box::new(record.clone())));
        Ok(record)
    }
}

#[async_trait]
impl ShiftRepository for DocumentStore {
    async fn list_open(&self, tenant_id: TenantId) -> RepoResult<Vec<Shift>> {
        let part = self.partition(tenant_id).await;
        let mut shifts: Vec<Shift> = part
            .shifts
            .values()
            .filter(|s| s.status == ShiftStatus::Open)
            .cloned()
            .collect();
        shifts.sort_by_key(|s| s.opened_at);
        Ok(shifts)
    }

    async fn save(&self, shift: Shift) -> RepoResult<Shift> {
        let mut part = self.partition(shift.tenant_id).await;
        part.shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }
}

#[async_trait]
impl SmartAlertRepository for DocumentStore {
    async fn raise(&self, alert: SmartAlert) -> RepoResult<SmartAlert> {
        let mut part = self.partition(alert.tenant_id).await;
        part.smart_alerts.push(alert.clone());
        Ok(alert)
    }

    async fn list(&self, tenant_id: TenantId) -> RepoResult<Vec<SmartAlert>> {
        let part = self.partition(tenant_id).await;
        let mut alerts = part.smart_alerts.clone();
        alerts.sort_by(|a, b| b.raised_at.cmp(&a.raised_at));
        Ok(alerts)
    }
}
