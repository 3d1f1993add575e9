use async_trait::async_trait;
use chrono::NaiveDate;
use innkeep_shared::types::TenantId;
use uuid::Uuid;

use super::RepoResult;
use crate::calendar::DateRange;
use crate::night_audit::{NightAuditRecord, SmartAlert};
use crate::shift::Shift;

/// Night audit records and the per-(tenant, date) run claim.
#[async_trait]
pub trait NightAuditRepository: Send + Sync {
    /// Loads the completed record of a date.
    async fn get(&self, tenant_id: TenantId, audit_date: NaiveDate) -> RepoResult<Option<NightAuditRecord>>;

    /// Lists completed records with audit dates inside `range`.
    async fn list(&self, tenant_id: TenantId, range: DateRange) -> RepoResult<Vec<NightAuditRecord>>;

    /// Atomically claims the (tenant, date) slot for `run_id`.
    /// `AlreadyExists` when the slot is claimed or completed.
    async fn claim(&self, tenant_id: TenantId, audit_date: NaiveDate, run_id: Uuid) -> RepoResult<()>;

    /// Gives up an uncompleted claim held by `run_id`.
    async fn release(&self, tenant_id: TenantId, audit_date: NaiveDate, run_id: Uuid) -> RepoResult<()>;

    /// Stores the record for the slot claimed by `record.run_id`. The record
    /// is immutable afterwards.
    async fn complete(&self, record: NightAuditRecord) -> RepoResult<NightAuditRecord>;
}

/// Front-desk cash shifts.
#[async_trait]
pub trait ShiftRepository: Send + Sync {
    /// Lists shifts that are still open.
    async fn list_open(&self, tenant_id: TenantId) -> RepoResult<Vec<Shift>>;

    /// Inserts or replaces a shift.
    async fn save(&self, shift: Shift) -> RepoResult<Shift>;
}

/// Operational alerts raised by batch jobs.
#[async_trait]
pub trait SmartAlertRepository: Send + Sync {
    /// Stores a new alert.
    async fn raise(&self, alert: SmartAlert) -> RepoResult<SmartAlert>;

    /// Lists alerts, newest first.
    async fn list(&self, tenant_id: TenantId) -> RepoResult<Vec<SmartAlert>>;
}
