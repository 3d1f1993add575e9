//! Night audit engine.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use innkeep_shared::types::{NightAuditId, TenantId};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::error::AuditError;
use super::tally;
use super::types::{AuditStatus, DiscrepancyKind, NightAuditRecord, SmartAlert};
use crate::actor::Actor;
use crate::calendar::{DateRange, MAX_RANGE_NIGHTS};
use crate::clock::Clock;
use crate::events::{DomainEvent, EventPublisher};
use crate::repository::{
    FolioQuery, FolioRepository, NightAuditRepository, RepositoryError, RoomRepository,
    ShiftRepository, SmartAlertRepository, StayQuery, StayRepository,
};
use crate::settings::CoreSettings;

/// Repositories the engine reads and writes.
#[derive(Clone)]
pub struct AuditStores {
    /// Room inventory and statuses.
    pub rooms: Arc<dyn RoomRepository>,
    /// Stays.
    pub stays: Arc<dyn StayRepository>,
    /// Folios.
    pub folios: Arc<dyn FolioRepository>,
    /// Audit records and claims.
    pub audits: Arc<dyn NightAuditRepository>,
    /// Cashier shifts.
    pub shifts: Arc<dyn ShiftRepository>,
    /// Smart alerts.
    pub alerts: Arc<dyn SmartAlertRepository>,
}

/// Runs the end-of-day reconciliation for one tenant and date.
pub struct NightAuditEngine {
    stores: AuditStores,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
    settings: CoreSettings,
}

impl NightAuditEngine {
    /// Creates the engine.
    pub fn new(stores: AuditStores, events: EventPublisher, clock: Arc<dyn Clock>, settings: CoreSettings) -> Self {
        Self {
            stores,
            events,
            clock,
            settings,
        }
    }

    /// Audits `audit_date` for `tenant_id`. Runs at most once per date: a
    /// second call, concurrent or later, is rejected without side effects.
    pub async fn run_for_tenant(
        &self,
        tenant_id: TenantId,
        audit_date: NaiveDate,
        actor: &Actor,
    ) -> Result<NightAuditRecord, AuditError> {
        if !actor.role.can_run_night_audit() {
            return Err(AuditError::NotPermitted);
        }
        let today = self.clock.today();
        if audit_date > today {
            return Err(AuditError::FutureDate { date: audit_date, today });
        }
        if self.stores.audits.get(tenant_id, audit_date).await?.is_some() {
            return Err(AuditError::AlreadyAudited(audit_date));
        }

        let run_id = Uuid::now_v7();
        match self.stores.audits.claim(tenant_id, audit_date, run_id).await {
            Ok(()) => {}
            Err(RepositoryError::AlreadyExists { .. }) => {
                warn!(%tenant_id, %audit_date, "night audit already claimed");
                return Err(AuditError::AlreadyAudited(audit_date));
            }
            Err(e) => return Err(e.into()),
        }
        info!(%tenant_id, %audit_date, %run_id, "night audit started");

        let record = match self.execute(tenant_id, audit_date, run_id, actor).await {
            Ok(record) => record,
            Err(e) => {
                error!(%tenant_id, %audit_date, %run_id, error = %e, "night audit failed, releasing claim");
                if let Err(release) = self.stores.audits.release(tenant_id, audit_date, run_id).await {
                    error!(%tenant_id, %audit_date, %run_id, error = %release, "failed to release night audit claim");
                }
                return Err(e);
            }
        };

        info!(
            %tenant_id,
            %audit_date,
            status = %record.status,
            discrepancies = record.discrepancies.len(),
            rooms_marked_dirty = record.rooms_marked_dirty.len(),
            occupancy = %record.summary.occupancy_rate,
            revenue = %record.summary.revenue,
            "night audit completed"
        );

        for discrepancy in &record.discrepancies {
            let alert = SmartAlert::from_discrepancy(&record, discrepancy);
            if let Err(e) = self.stores.alerts.raise(alert).await {
                error!(%tenant_id, %audit_date, kind = discrepancy.kind.as_str(), error = %e, "failed to raise smart alert");
            }
        }

        self.events.publish(
            tenant_id,
            record.completed_at,
            DomainEvent::AuditCompleted {
                record_id: record.id,
                audit_date,
                status: record.status,
                discrepancies: record.discrepancies.len(),
            },
        );
        Ok(record)
    }

    /// Loads the record of a date.
    pub async fn get_record(&self, tenant_id: TenantId, audit_date: NaiveDate) -> Result<NightAuditRecord, AuditError> {
        self.stores
            .audits
            .get(tenant_id, audit_date)
            .await?
            .ok_or(AuditError::RecordNotFound(audit_date))
    }

    /// Lists records in `[from, to)`.
    pub async fn list_records(
        &self,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NightAuditRecord>, AuditError> {
        let range = DateRange::new(from, to)?;
        Ok(self.stores.audits.list(tenant_id, range).await?)
    }

    /// Everything between the claim and the stored record.
    async fn execute(
        &self,
        tenant_id: TenantId,
        audit_date: NaiveDate,
        run_id: Uuid,
        actor: &Actor,
    ) -> Result<NightAuditRecord, AuditError> {
        let started_at = self.clock.now();
        let rooms = self.stores.rooms.list_rooms(tenant_id, None).await?;
        let stays = self.stores.stays.list(tenant_id, &StayQuery::default()).await?;
        let folios = self.stores.folios.list(tenant_id, FolioQuery::default()).await?;
        let shifts = self.stores.shifts.list_open(tenant_id).await?;

        let summary = tally::summarize(&rooms, &stays, &folios, audit_date);
        let by_id: HashMap<_, _> = stays.iter().map(|s| (s.id, s.clone())).collect();
        let reported = self.reported_open_folios(tenant_id, audit_date).await?;
        let discrepancies = tally::find_discrepancies(
            &shifts,
            &folios,
            &by_id,
            &reported,
            &summary,
            audit_date,
            self.settings.balance_epsilon,
        );

        let dirty = tally::rooms_to_mark_dirty(&rooms, &stays, audit_date);
        if !dirty.is_empty() {
            self.stores.rooms.set_room_statuses(tenant_id, &dirty, self.clock.now()).await?;
        }

        let record = NightAuditRecord {
            id: NightAuditId::new(),
            tenant_id,
            audit_date,
            run_id,
            status: AuditStatus::for_discrepancies(discrepancies.len()),
            summary,
            discrepancies,
            rooms_marked_dirty: dirty.iter().map(|c| c.room_id).collect(),
            run_by: actor.user_id,
            started_at,
            completed_at: self.clock.now(),
        };
        Ok(self.stores.audits.complete(record).await?)
    }

    /// Folios that records of the preceding year already reported as open
    /// after departure.
    async fn reported_open_folios(&self, tenant_id: TenantId, audit_date: NaiveDate) -> Result<BTreeSet<String>, AuditError> {
        let lookback = DateRange::new(audit_date - Duration::days(MAX_RANGE_NIGHTS), audit_date)?;
        let records = self.stores.audits.list(tenant_id, lookback).await?;
        Ok(records
            .iter()
            .flat_map(|r| &r.discrepancies)
            .filter(|d| d.kind == DiscrepancyKind::OpenFolioAfterDeparture)
            .filter_map(|d| d.entity_id.clone())
            .collect())
    }
}
