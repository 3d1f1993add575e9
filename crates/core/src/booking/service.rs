//! Booking orchestrator: the stay lifecycle across rooms, folios, deposits
//! and overbooking.

use std::sync::Arc;

use chrono::NaiveDate;
use innkeep_shared::types::{FolioId, RoomId, StayId, TenantId, is_settled};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::error::BookingError;
use super::types::{
    CheckOutInput, CreateStayInput, GuestInfo, MoveStayInput, Stay, StayFilter, StayStatus,
};
use crate::actor::Actor;
use crate::availability::PostQueryFilter;
use crate::calendar::DateRange;
use crate::clock::Clock;
use crate::deposit::{DepositContext, DepositService};
use crate::events::{DomainEvent, EventPublisher};
use crate::folio::{Folio, FolioLedger, FolioService};
use crate::overbooking::OverbookingMonitor;
use crate::repository::{RoomGuard, RoomRepository, StayQuery, StayRepository, StayWrite};
use crate::room::{Room, RoomStatus, RoomStatusChange};
use crate::settings::CoreSettings;

/// Longest accepted guest name.
pub const MAX_GUEST_NAME_LEN: usize = 200;

/// Creates, moves and transitions stays.
///
/// Room-date contention is resolved optimistically: every stay commit is
/// conditional on the booking version of the room(s) it touches, and a lost
/// race re-reads the room and re-checks availability.
pub struct BookingOrchestrator {
    rooms: Arc<dyn RoomRepository>,
    stays: Arc<dyn StayRepository>,
    folios: Arc<FolioService>,
    deposits: Arc<DepositService>,
    overbooking: Arc<OverbookingMonitor>,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
    settings: CoreSettings,
}

impl BookingOrchestrator {
    /// Creates the orchestrator.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        stays: Arc<dyn StayRepository>,
        folios: Arc<FolioService>,
        deposits: Arc<DepositService>,
        overbooking: Arc<OverbookingMonitor>,
        events: EventPublisher,
        clock: Arc<dyn Clock>,
        settings: CoreSettings,
    ) -> Self {
        Self {
            rooms,
            stays,
            folios,
            deposits,
            overbooking,
            events,
            clock,
            settings,
        }
    }

    /// Books a stay.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        input: CreateStayInput,
    ) -> Result<Stay, BookingError> {
        let dates = DateRange::new(input.check_in, input.check_out)?;
        validate_guest(&input.guest)?;
        if input.total_rate < Decimal::ZERO {
            return Err(BookingError::Validation("total_rate cannot be negative".into()));
        }
        let room = self.load_room(tenant_id, input.room_id).await?;

        let quote = self
            .deposits
            .quote(
                tenant_id,
                &DepositContext {
                    category_id: room.category_id,
                    rate_plan_id: input.rate_plan_id,
                    dates,
                    total_rate: input.total_rate,
                    holidays: input.holidays,
                    peak_season: input.peak_season,
                },
            )
            .await?;

        let now = self.clock.now();
        let stay = Stay {
            id: StayId::new(),
            tenant_id,
            room_id: room.id,
            category_id: room.category_id,
            guest: GuestInfo {
                name: input.guest.name.trim().to_string(),
                ..input.guest
            },
            dates,
            status: StayStatus::Confirmed,
            total_rate: input.total_rate,
            rate_plan_id: input.rate_plan_id,
            deposit_amount: quote.amount,
            deposit_required: quote.required,
            deposit_policy_id: quote.policy_id,
            folio_id: None,
            extensions: input.extensions,
            created_by: actor.user_id,
            created_at: now,
            updated_at: now,
            checked_in_at: None,
            checked_out_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            no_show_at: None,
            version: 0,
        };

        for attempt in 0..=self.settings.max_commit_retries {
            let guard = self.check_room(tenant_id, &room, dates, None).await?;
            let write = StayWrite {
                stay: stay.clone(),
                expected_version: None,
                room_guards: vec![guard],
            };
            match self.stays.commit(write).await {
                Ok(saved) => {
                    info!(
                        %tenant_id,
                        stay_id = %saved.id,
                        room_id = %saved.room_id,
                        %dates,
                        deposit = %saved.deposit_amount,
                        deposit_required = saved.deposit_required,
                        "stay booked"
                    );
                    self.after_booking(tenant_id, &saved).await;
                    self.events.publish(
                        tenant_id,
                        now,
                        DomainEvent::BookingConfirmed {
                            stay_id: saved.id,
                            room_id: saved.room_id,
                            dates,
                            total_rate: saved.total_rate,
                            deposit_amount: saved.deposit_amount,
                        },
                    );
                    return Ok(saved);
                }
                Err(e) if e.is_version_conflict() => {
                    warn!(%tenant_id, room_id = %room.id, attempt, "room booked concurrently, re-checking");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(BookingError::RoomContention(room.id))
    }

    /// Moves a stay to another room and/or dates.
    ///
    /// A checked-in stay may change room and departure but not its arrival.
    pub async fn move_stay(
        &self,
        tenant_id: TenantId,
        stay_id: StayId,
        input: MoveStayInput,
    ) -> Result<Stay, BookingError> {
        let dates = DateRange::new(input.check_in, input.check_out)?;
        let target = self.load_room(tenant_id, input.room_id).await?;

        for attempt in 0..=self.settings.max_commit_retries {
            let current = self.load_stay(tenant_id, stay_id).await?;
            match current.status {
                StayStatus::Confirmed => {}
                StayStatus::CheckedIn if current.dates.start() == dates.start() => {}
                StayStatus::CheckedIn => return Err(BookingError::CheckInDateLocked(stay_id)),
                status => {
                    return Err(BookingError::InvalidTransition {
                        stay_id,
                        status,
                        action: "move",
                    });
                }
            }

            let mut guards = vec![self.check_room(tenant_id, &target, dates, Some(stay_id)).await?];
            if current.room_id != target.id {
                let version = self.stays.list_for_room(tenant_id, current.room_id).await?.version;
                guards.push(RoomGuard {
                    room_id: current.room_id,
                    version,
                });
            }

            let mut next = current.clone();
            next.room_id = target.id;
            next.category_id = target.category_id;
            next.dates = dates;
            next.updated_at = self.clock.now();

            let write = StayWrite {
                stay: next,
                expected_version: Some(current.version),
                room_guards: guards,
            };
            match self.stays.commit(write).await {
                Ok(saved) => {
                    info!(
                        %tenant_id,
                        %stay_id,
                        from_room = %current.room_id,
                        to_room = %saved.room_id,
                        from = %current.dates,
                        to = %saved.dates,
                        "stay moved"
                    );
                    if saved.status == StayStatus::CheckedIn && current.room_id != saved.room_id {
                        self.set_room_statuses(
                            tenant_id,
                            &[
                                RoomStatusChange {
                                    room_id: current.room_id,
                                    status: RoomStatus::Dirty,
                                },
                                RoomStatusChange {
                                    room_id: saved.room_id,
                                    status: RoomStatus::Occupied,
                                },
                            ],
                        )
                        .await;
                    }
                    self.after_booking(tenant_id, &saved).await;
                    self.events.publish(
                        tenant_id,
                        saved.updated_at,
                        DomainEvent::StayMoved {
                            stay_id,
                            from_room: current.room_id,
                            to_room: saved.room_id,
                            from_dates: current.dates,
                            to_dates: saved.dates,
                        },
                    );
                    return Ok(saved);
                }
                Err(e) if e.is_version_conflict() => {
                    warn!(%tenant_id, %stay_id, attempt, "stay or room changed during move, re-checking");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(BookingError::StayContention(stay_id))
    }

    /// Checks a guest in: marks the stay checked in, then opens (or reuses)
    /// the folio, posts the room rate once and marks the room occupied.
    ///
    /// The stay transition commits first, conditional on the version read.
    /// The folio steps are idempotent and check-out repeats them, so a failure
    /// after the transition leaves nothing that check-out cannot complete.
    pub async fn check_in(&self, tenant_id: TenantId, actor: &Actor, stay_id: StayId) -> Result<Stay, BookingError> {
        let now = self.clock.now();
        let checked_in = self
            .transition(tenant_id, stay_id, StayStatus::CheckedIn, "check in", |s| {
                s.checked_in_at = Some(now);
            })
            .await?;

        let folio = self.ensure_folio(tenant_id, actor, &checked_in).await?;
        let folio_id = folio.id;
        let saved = self.attach_folio(tenant_id, stay_id, folio_id).await?;

        self.set_room_statuses(
            tenant_id,
            &[RoomStatusChange {
                room_id: saved.room_id,
                status: RoomStatus::Occupied,
            }],
        )
        .await;

        info!(%tenant_id, %stay_id, %folio_id, room_id = %saved.room_id, "guest checked in");
        self.events.publish(
            tenant_id,
            now,
            DomainEvent::StayCheckedIn {
                stay_id,
                room_id: saved.room_id,
                folio_id,
            },
        );
        Ok(saved)
    }

    /// Checks a guest out: posts final items, closes the folio, frees the
    /// room for housekeeping.
    ///
    /// The settlement check runs against the projected balance before anything
    /// is posted, so a rejected checkout leaves the folio untouched.
    pub async fn check_out(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        stay_id: StayId,
        input: CheckOutInput,
    ) -> Result<Stay, BookingError> {
        if input.manager_override && !actor.is_elevated() {
            return Err(BookingError::OverrideNotPermitted);
        }
        let stay = self.load_stay(tenant_id, stay_id).await?;
        if !stay.status.can_transition_to(StayStatus::CheckedOut) {
            return Err(BookingError::InvalidTransition {
                stay_id,
                status: stay.status,
                action: "check out",
            });
        }

        let folio = match stay.folio_id {
            Some(folio_id) => self.folios.get(tenant_id, folio_id).await?,
            None => self.ensure_folio(tenant_id, actor, &stay).await?,
        };
        let has_items = !input.final_charges.is_empty() || input.payment.is_some();
        if folio.is_open() {
            self.settle_folio(tenant_id, actor, &folio, input).await?;
        } else if has_items {
            FolioLedger::ensure_open(&folio)?;
        }

        let now = self.clock.now();
        let saved = self
            .transition(tenant_id, stay_id, StayStatus::CheckedOut, "check out", |s| {
                s.checked_out_at = Some(now);
            })
            .await?;

        self.set_room_statuses(
            tenant_id,
            &[RoomStatusChange {
                room_id: saved.room_id,
                status: RoomStatus::Dirty,
            }],
        )
        .await;

        info!(%tenant_id, %stay_id, folio_id = %folio.id, room_id = %saved.room_id, "guest checked out");
        self.events.publish(
            tenant_id,
            now,
            DomainEvent::StayCheckedOut {
                stay_id,
                room_id: saved.room_id,
                folio_id: folio.id,
            },
        );
        Ok(saved)
    }

    /// Cancels a confirmed stay, freeing its nights.
    pub async fn cancel(&self, tenant_id: TenantId, stay_id: StayId, reason: &str) -> Result<Stay, BookingError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(BookingError::Validation("a cancellation reason is required".into()));
        }
        let now = self.clock.now();
        let saved = self
            .transition(tenant_id, stay_id, StayStatus::Cancelled, "cancel", |s| {
                s.cancelled_at = Some(now);
                s.cancellation_reason = Some(reason.to_string());
            })
            .await?;

        info!(%tenant_id, %stay_id, reason, "stay cancelled");
        self.events.publish(
            tenant_id,
            now,
            DomainEvent::StayCancelled {
                stay_id,
                reason: reason.to_string(),
            },
        );
        Ok(saved)
    }

    /// Marks a confirmed stay as a no-show, freeing its nights.
    pub async fn mark_no_show(&self, tenant_id: TenantId, stay_id: StayId) -> Result<Stay, BookingError> {
        let now = self.clock.now();
        let saved = self
            .transition(tenant_id, stay_id, StayStatus::NoShow, "mark as no-show", |s| {
                s.no_show_at = Some(now);
            })
            .await?;

        info!(%tenant_id, %stay_id, "stay marked no-show");
        self.events
            .publish(tenant_id, now, DomainEvent::StayNoShow { stay_id });
        Ok(saved)
    }

    /// Loads a stay.
    pub async fn get(&self, tenant_id: TenantId, stay_id: StayId) -> Result<Stay, BookingError> {
        self.load_stay(tenant_id, stay_id).await
    }

    /// Lists stays, earliest booked first.
    pub async fn list(&self, tenant_id: TenantId, filter: &StayFilter) -> Result<Vec<Stay>, BookingError> {
        let query = StayQuery {
            room_ids: filter.room_id.map(|id| vec![id]),
            category_id: None,
            statuses: filter.statuses.clone(),
        };
        let stays = self.stays.list(tenant_id, &query).await?;
        let mut post = PostQueryFilter::with_statuses(filter.statuses.clone());
        if let Some(window) = filter.overlapping {
            post = post.overlapping(window);
        }
        Ok(post.apply(stays))
    }

    async fn load_room(&self, tenant_id: TenantId, room_id: RoomId) -> Result<Room, BookingError> {
        self.rooms
            .get_room(tenant_id, room_id)
            .await?
            .ok_or(BookingError::RoomNotFound(room_id))
    }

    async fn load_stay(&self, tenant_id: TenantId, stay_id: StayId) -> Result<Stay, BookingError> {
        self.stays
            .get(tenant_id, stay_id)
            .await?
            .ok_or(BookingError::StayNotFound(stay_id))
    }

    /// Verifies `dates` can be sold on `room` and returns the guard to commit with.
    async fn check_room(
        &self,
        tenant_id: TenantId,
        room: &Room,
        dates: DateRange,
        exclude: Option<StayId>,
    ) -> Result<RoomGuard, BookingError> {
        if room.status == RoomStatus::OutOfOrder {
            return Err(BookingError::RoomBlocked {
                room_id: room.id,
                date: dates.start(),
            });
        }
        let blocks = self.rooms.list_blocks(tenant_id, room.id).await?;
        if let Some(overlap) = blocks.iter().find_map(|b| b.dates.intersection(&dates)) {
            warn!(%tenant_id, room_id = %room.id, %dates, "room blocked");
            return Err(BookingError::RoomBlocked {
                room_id: room.id,
                date: overlap.start(),
            });
        }

        let room_stays = self.stays.list_for_room(tenant_id, room.id).await?;
        let mut filter = PostQueryFilter::active().overlapping(dates);
        if let Some(stay_id) = exclude {
            filter = filter.excluding(stay_id);
        }
        let conflicts = filter.apply(room_stays.stays);
        if !conflicts.is_empty() {
            let nights: Vec<NaiveDate> = dates
                .iter_nights()
                .filter(|d| conflicts.iter().any(|s| s.dates.contains_night(*d)))
                .collect();
            if let Err(e) = self
                .overbooking
                .check_capacity(tenant_id, room.category_id, &nights, exclude)
                .await
            {
                warn!(%tenant_id, room_id = %room.id, %dates, error = %e, "booking rejected");
                return Err(e.into());
            }
        }

        Ok(RoomGuard {
            room_id: room.id,
            version: room_stays.version,
        })
    }

    /// Applies a status transition with a conditional write, re-reading on conflict.
    async fn transition<F>(
        &self,
        tenant_id: TenantId,
        stay_id: StayId,
        target: StayStatus,
        action: &'static str,
        mut apply: F,
    ) -> Result<Stay, BookingError>
    where
        F: FnMut(&mut Stay) + Send,
    {
        self.rewrite(tenant_id, stay_id, action, |current| {
            if !current.status.can_transition_to(target) {
                return Err(BookingError::InvalidTransition {
                    stay_id,
                    status: current.status,
                    action,
                });
            }
            let mut next = current.clone();
            next.status = target;
            apply(&mut next);
            Ok(Some(next))
        })
        .await
    }

    /// Records the folio on the stay unless it is already there.
    async fn attach_folio(&self, tenant_id: TenantId, stay_id: StayId, folio_id: FolioId) -> Result<Stay, BookingError> {
        self.rewrite(tenant_id, stay_id, "attach folio", |current| {
            if current.folio_id == Some(folio_id) {
                return Ok(None);
            }
            let mut next = current.clone();
            next.folio_id = Some(folio_id);
            Ok(Some(next))
        })
        .await
    }

    /// Read, change, conditionally write; retried on version conflicts.
    /// `change` returning `None` means there is nothing to write.
    async fn rewrite<F>(
        &self,
        tenant_id: TenantId,
        stay_id: StayId,
        action: &'static str,
        mut change: F,
    ) -> Result<Stay, BookingError>
    where
        F: FnMut(&Stay) -> Result<Option<Stay>, BookingError> + Send,
    {
        for attempt in 0..=self.settings.max_commit_retries {
            let current = self.load_stay(tenant_id, stay_id).await?;
            let Some(mut next) = change(&current)? else {
                return Ok(current);
            };
            next.updated_at = self.clock.now();

            let write = StayWrite {
                stay: next,
                expected_version: Some(current.version),
                room_guards: Vec::new(),
            };
            match self.stays.commit(write).await {
                Ok(saved) => return Ok(saved),
                Err(e) if e.is_version_conflict() => {
                    warn!(%tenant_id, %stay_id, action, attempt, "stay changed concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(BookingError::StayContention(stay_id))
    }

    /// Opens (or reuses) the stay's folio and posts the room rate once.
    async fn ensure_folio(&self, tenant_id: TenantId, actor: &Actor, stay: &Stay) -> Result<Folio, BookingError> {
        let folio = self.folios.open_for_stay(tenant_id, actor, stay.id).await?;
        if !folio.is_open() {
            return Ok(folio);
        }
        Ok(self
            .folios
            .post_room_rate_once(tenant_id, actor, folio.id, stay.total_rate)
            .await?)
    }

    /// Posts final items and closes the folio, or fails before posting anything.
    async fn settle_folio(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        folio: &Folio,
        input: CheckOutInput,
    ) -> Result<(), BookingError> {
        let mut projected = folio.balance;
        for charge in &input.final_charges {
            FolioLedger::validate_charge(charge)?;
            projected += FolioLedger::line_total(
                charge.unit_amount,
                charge.quantity,
                charge.tax_rate.unwrap_or(Decimal::ZERO),
            );
        }
        if let Some(payment) = &input.payment {
            FolioLedger::validate_payment(payment)?;
            projected -= payment.amount;
        }
        if !input.manager_override && !is_settled(projected, self.settings.balance_epsilon) {
            warn!(%tenant_id, folio_id = %folio.id, balance = %projected, "checkout blocked by open balance");
            return Err(BookingError::BalanceNotSettled { balance: projected });
        }

        for charge in input.final_charges {
            self.folios.add_charge(tenant_id, actor, folio.id, charge).await?;
        }
        if let Some(payment) = input.payment {
            self.folios.record_payment(tenant_id, actor, folio.id, payment).await?;
        }
        self.folios
            .close(tenant_id, actor, folio.id, input.manager_override)
            .await?;
        Ok(())
    }

    /// Room status follow-up after a committed stay change. Failures are
    /// logged; the stay change stands.
    async fn set_room_statuses(&self, tenant_id: TenantId, changes: &[RoomStatusChange]) {
        if let Err(e) = self.rooms.set_room_statuses(tenant_id, changes, self.clock.now()).await {
            error!(%tenant_id, ?changes, error = %e, "room status update failed after stay commit");
        }
    }

    /// Overbooking follow-up after a committed booking. Failures are logged.
    async fn after_booking(&self, tenant_id: TenantId, stay: &Stay) {
        if let Err(e) = self
            .overbooking
            .record_nights(tenant_id, stay.category_id, stay.dates)
            .await
        {
            warn!(%tenant_id, stay_id = %stay.id, error = %e, "overbooking evaluation failed");
        }
    }
}

fn validate_guest(guest: &GuestInfo) -> Result<(), BookingError> {
    let name = guest.name.trim();
    if name.is_empty() {
        return Err(BookingError::Validation("guest name is required".into()));
    }
    if name.chars().count() > MAX_GUEST_NAME_LEN {
        return Err(BookingError::Validation(format!(
            "guest name must be at most {MAX_GUEST_NAME_LEN} characters"
        )));
    }
    if guest.adults == 0 {
        return Err(BookingError::Validation("at least one adult is required".into()));
    }
    Ok(())
}
