//! Overbooking monitor: capacity checks, daily snapshots and alerts.

use std::sync::Arc;

use chrono::NaiveDate;
use innkeep_shared::types::{OverbookingAlertId, OverbookingSettingId, RoomCategoryId, StayId, TenantId};
use tracing::{info, warn};

use super::calculator::{EffectivePolicy, OverbookingCalculator};
use super::error::OverbookingError;
use super::types::{
    AlertStatus, OverbookingAlert, OverbookingSetting, OverbookingSnapshot, SettingInput, Severity,
};
use crate::actor::Actor;
use crate::availability::PostQueryFilter;
use crate::booking::Stay;
use crate::calendar::DateRange;
use crate::clock::Clock;
use crate::events::{DomainEvent, EventPublisher};
use crate::repository::{AlertQuery, OverbookingRepository, RepositoryError, RoomRepository, StayQuery, StayRepository};
use crate::settings::CoreSettings;

/// Rooms and active stays of one category.
struct CategoryLoad {
    total_rooms: u32,
    stays: Vec<Stay>,
}

impl CategoryLoad {
    fn booked_on(&self, date: NaiveDate, exclude: Option<StayId>) -> u32 {
        let count = self
            .stays
            .iter()
            .filter(|s| s.dates.contains_night(date) && Some(s.id) != exclude)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Tracks booked-vs-capacity per category and night.
pub struct OverbookingMonitor {
    rooms: Arc<dyn RoomRepository>,
    stays: Arc<dyn StayRepository>,
    overbooking: Arc<dyn OverbookingRepository>,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
    settings: CoreSettings,
}

impl OverbookingMonitor {
    /// Creates the monitor.
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        stays: Arc<dyn StayRepository>,
        overbooking: Arc<dyn OverbookingRepository>,
        events: EventPublisher,
        clock: Arc<dyn Clock>,
        settings: CoreSettings,
    ) -> Self {
        Self {
            rooms,
            stays,
            overbooking,
            events,
            clock,
            settings,
        }
    }

    /// Thresholds in force for a category.
    pub async fn policy_for(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
    ) -> Result<EffectivePolicy, OverbookingError> {
        let settings = self.overbooking.list_settings(tenant_id).await?;
        Ok(OverbookingCalculator::effective_policy(
            &settings,
            category_id,
            self.settings.overbooking,
        ))
    }

    /// Creates or replaces the setting of a scope. Managers and admins only.
    pub async fn upsert_setting(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        input: SettingInput,
    ) -> Result<OverbookingSetting, OverbookingError> {
        if !actor.is_elevated() {
            return Err(OverbookingError::NotPermitted);
        }
        OverbookingCalculator::validate(&input)?;
        if let Some(category_id) = input.category_id {
            self.rooms
                .get_category(tenant_id, category_id)
                .await?
                .ok_or(OverbookingError::CategoryNotFound(category_id))?;
        }

        let existing = self
            .overbooking
            .list_settings(tenant_id)
            .await?
            .into_iter()
            .find(|s| s.category_id == input.category_id);

        let setting = OverbookingSetting {
            id: existing.map_or_else(OverbookingSettingId::new, |s| s.id),
            tenant_id,
            category_id: input.category_id,
            allow_overbooking: input.allow_overbooking,
            max_overbooking_percent: input.max_overbooking_percent,
            alert_threshold_percent: input.alert_threshold_percent,
            critical_threshold_percent: input.critical_threshold_percent,
            updated_by: Some(actor.user_id),
            updated_at: self.clock.now(),
        };
        let saved = self.overbooking.upsert_setting(setting).await?;
        info!(
            %tenant_id,
            category_id = ?saved.category_id,
            allow = saved.allow_overbooking,
            max = %saved.max_overbooking_percent,
            "overbooking setting saved"
        );
        Ok(saved)
    }

    /// Lists the tenant's settings.
    pub async fn list_settings(&self, tenant_id: TenantId) -> Result<Vec<OverbookingSetting>, OverbookingError> {
        Ok(self.overbooking.list_settings(tenant_id).await?)
    }

    /// One snapshot per night of `[from, to)`.
    pub async fn status(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OverbookingSnapshot>, OverbookingError> {
        let dates = DateRange::new(from, to)?;
        self.rooms
            .get_category(tenant_id, category_id)
            .await?
            .ok_or(OverbookingError::CategoryNotFound(category_id))?;

        let policy = self.policy_for(tenant_id, category_id).await?;
        let load = self.load(tenant_id, category_id, dates).await?;
        Ok(dates
            .iter_nights()
            .map(|date| {
                OverbookingCalculator::snapshot(
                    category_id,
                    date,
                    load.total_rooms,
                    load.booked_on(date, None),
                    &policy,
                )
            })
            .collect())
    }

    /// Checks that one more stay fits on each of `nights`.
    ///
    /// Called only for nights on which the target room is already taken.
    /// `exclude` keeps a stay being moved from counting against itself.
    pub async fn check_capacity(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
        nights: &[NaiveDate],
        exclude: Option<StayId>,
    ) -> Result<(), OverbookingError> {
        let (Some(first), Some(last)) = (nights.iter().min(), nights.iter().max()) else {
            return Ok(());
        };
        let policy = self.policy_for(tenant_id, category_id).await?;
        if !policy.allow_overbooking {
            return Err(OverbookingError::OverbookingNotAllowed {
                category_id,
                date: *first,
            });
        }

        let window = DateRange::new(*first, *last + chrono::Duration::days(1))?;
        let load = self.load(tenant_id, category_id, window).await?;
        for &date in nights {
            let booked_after = load.booked_on(date, exclude).saturating_add(1);
            if !OverbookingCalculator::within_limit(load.total_rooms, booked_after, policy.max_overbooking_percent) {
                warn!(
                    %tenant_id,
                    %category_id,
                    %date,
                    total_rooms = load.total_rooms,
                    booked_after,
                    "overbooking ceiling reached"
                );
                return Err(OverbookingError::LimitExceeded {
                    category_id,
                    date,
                    max_percent: policy.max_overbooking_percent,
                });
            }
        }
        Ok(())
    }

    /// Re-evaluates every night of `dates` after a commit and raises or
    /// updates alerts for nights at or above the alert threshold.
    pub async fn record_nights(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
        dates: DateRange,
    ) -> Result<Vec<OverbookingAlert>, OverbookingError> {
        let policy = self.policy_for(tenant_id, category_id).await?;
        let load = self.load(tenant_id, category_id, dates).await?;

        let mut alerts = Vec::new();
        for date in dates.iter_nights() {
            let snapshot =
                OverbookingCalculator::snapshot(category_id, date, load.total_rooms, load.booked_on(date, None), &policy);
            if snapshot.severity != Severity::Normal {
                alerts.push(self.raise_or_update(tenant_id, &snapshot).await?);
            }
        }
        Ok(alerts)
    }

    /// Marks an alert resolved. Terminal.
    pub async fn resolve(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        alert_id: OverbookingAlertId,
        notes: &str,
    ) -> Result<OverbookingAlert, OverbookingError> {
        let notes = notes.trim();
        if notes.is_empty() {
            return Err(OverbookingError::MissingNotes);
        }

        for _ in 0..=self.settings.max_commit_retries {
            let current = self
                .overbooking
                .get_alert(tenant_id, alert_id)
                .await?
                .ok_or(OverbookingError::AlertNotFound(alert_id))?;
            if !current.is_open() {
                return Err(OverbookingError::AlreadyResolved(alert_id));
            }

            let mut next = current.clone();
            next.status = AlertStatus::Resolved;
            next.resolved_at = Some(self.clock.now());
            next.resolved_by = Some(actor.user_id);
            next.resolution_notes = Some(notes.to_string());

            match self.overbooking.update_alert(next, current.version).await {
                Ok(saved) => {
                    info!(%tenant_id, %alert_id, "overbooking alert resolved");
                    return Ok(saved);
                }
                Err(e) if e.is_version_conflict() => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(OverbookingError::ConcurrentModification(alert_id))
    }

    /// Lists alerts.
    pub async fn list_alerts(
        &self,
        tenant_id: TenantId,
        query: AlertQuery,
    ) -> Result<Vec<OverbookingAlert>, OverbookingError> {
        Ok(self.overbooking.list_alerts(tenant_id, query).await?)
    }

    async fn load(
        &self,
        tenant_id: TenantId,
        category_id: RoomCategoryId,
        window: DateRange,
    ) -> Result<CategoryLoad, OverbookingError> {
        let rooms = self.rooms.list_rooms(tenant_id, Some(category_id)).await?;
        let stays = self
            .stays
            .list(tenant_id, &StayQuery::active_in_category(category_id))
            .await?;
        Ok(CategoryLoad {
            total_rooms: u32::try_from(rooms.len()).unwrap_or(u32::MAX),
            stays: PostQueryFilter::active().overlapping(window).apply(stays),
        })
    }

    async fn raise_or_update(
        &self,
        tenant_id: TenantId,
        snapshot: &OverbookingSnapshot,
    ) -> Result<OverbookingAlert, OverbookingError> {
        for _ in 0..=self.settings.max_commit_retries {
            let now = self.clock.now();
            let open = self
                .overbooking
                .find_open_alert(tenant_id, snapshot.category_id, snapshot.date)
                .await?;

            if let Some(current) = open {
                let mut next = current.clone();
                next.total_rooms = snapshot.total_rooms;
                next.booked = snapshot.booked;
                next.overbooking_count = snapshot.overbooking_count;
                next.overbooking_percent = snapshot.overbooking_percent;
                next.severity = snapshot.severity;
                next.updated_at = now;
                match self.overbooking.update_alert(next, current.version).await {
                    Ok(saved) => return Ok(saved),
                    Err(e) if e.is_version_conflict() => continue,
                    Err(e) => return Err(e.into()),
                }
            }

            let alert = OverbookingAlert {
                id: OverbookingAlertId::new(),
                tenant_id,
                category_id: snapshot.category_id,
                date: snapshot.date,
                total_rooms: snapshot.total_rooms,
                booked: snapshot.booked,
                overbooking_count: snapshot.overbooking_count,
                overbooking_percent: snapshot.overbooking_percent,
                severity: snapshot.severity,
                status: AlertStatus::Open,
                raised_at: now,
                updated_at: now,
                resolved_at: None,
                resolved_by: None,
                resolution_notes: None,
                version: 0,
            };
            match self.overbooking.insert_alert(alert).await {
                Ok(saved) => {
                    warn!(
                        %tenant_id,
                        category_id = %saved.category_id,
                        date = %saved.date,
                        percent = %saved.overbooking_percent,
                        severity = ?saved.severity,
                        "overbooking alert raised"
                    );
                    self.events.publish(
                        tenant_id,
                        now,
                        DomainEvent::OverbookingAlertRaised {
                            alert_id: saved.id,
                            category_id: saved.category_id,
                            date: saved.date,
                            overbooking_percent: saved.overbooking_percent,
                            severity: saved.severity,
                        },
                    );
                    return Ok(saved);
                }
                // Someone else opened it first; loop round and update theirs.
                Err(RepositoryError::AlreadyExists { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Err(RepositoryError::version_conflict(
            "overbooking_alert",
            format!("{}/{}", snapshot.category_id, snapshot.date),
        )
        .into())
    }
}
