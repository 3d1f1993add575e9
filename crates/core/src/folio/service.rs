//! Folio service: the persisted side of the ledger.

use std::sync::Arc;

use innkeep_shared::types::{FolioId, PaymentId, StayId, TenantId};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::error::FolioError;
use super::ledger::FolioLedger;
use super::types::{Charge, ChargeCategory, Folio, NewCharge, NewPayment, Payment, PaymentStatus};
use crate::actor::Actor;
use crate::clock::Clock;
use crate::events::{DomainEvent, EventPublisher};
use crate::repository::{FolioQuery, FolioRepository, RepositoryError, StayRepository};
use crate::settings::CoreSettings;

/// Description of the charge posted at check-in.
pub const ROOM_RATE_DESCRIPTION: &str = "Room rate";

/// Per-stay charges, payments and balance.
///
/// Every mutation reads the folio, applies a [`FolioLedger`] step to a copy,
/// re-verifies the ledger and writes the copy conditionally on the version
/// read. Lost races are retried from a fresh read.
pub struct FolioService {
    folios: Arc<dyn FolioRepository>,
    stays: Arc<dyn StayRepository>,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
    settings: CoreSettings,
}

impl FolioService {
    /// Creates the service.
    pub fn new(
        folios: Arc<dyn FolioRepository>,
        stays: Arc<dyn StayRepository>,
        events: EventPublisher,
        clock: Arc<dyn Clock>,
        settings: CoreSettings,
    ) -> Self {
        Self {
            folios,
            stays,
            events,
            clock,
            settings,
        }
    }

    /// Returns the stay's folio, creating an open one if it has none.
    pub async fn open_for_stay(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        stay_id: StayId,
    ) -> Result<Folio, FolioError> {
        if let Some(existing) = self.folios.find_by_stay(tenant_id, stay_id).await? {
            return Ok(existing);
        }
        self.stays
            .get(tenant_id, stay_id)
            .await?
            .ok_or(FolioError::StayNotFound(stay_id))?;

        let folio = Folio::open(tenant_id, stay_id, actor.user_id, self.clock.now());
        match self.folios.insert(folio).await {
            Ok(saved) => {
                info!(%tenant_id, %stay_id, folio_id = %saved.id, "folio opened");
                Ok(saved)
            }
            Err(RepositoryError::AlreadyExists { .. }) => self
                .folios
                .find_by_stay(tenant_id, stay_id)
                .await?
                .ok_or_else(|| RepositoryError::not_found("folio", stay_id).into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads a folio.
    pub async fn get(&self, tenant_id: TenantId, folio_id: FolioId) -> Result<Folio, FolioError> {
        self.folios
            .get(tenant_id, folio_id)
            .await?
            .ok_or(FolioError::NotFound(folio_id))
    }

    /// Loads the folio of a stay.
    pub async fn find_by_stay(&self, tenant_id: TenantId, stay_id: StayId) -> Result<Option<Folio>, FolioError> {
        Ok(self.folios.find_by_stay(tenant_id, stay_id).await?)
    }

    /// Lists folios.
    pub async fn list(&self, tenant_id: TenantId, query: FolioQuery) -> Result<Vec<Folio>, FolioError> {
        Ok(self.folios.list(tenant_id, query).await?)
    }

    /// Posts a charge.
    pub async fn add_charge(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        folio_id: FolioId,
        input: NewCharge,
    ) -> Result<(Folio, Charge), FolioError> {
        FolioLedger::validate_charge(&input)?;
        let now = self.clock.now();
        let (folio, charge) = self
            .mutate(tenant_id, folio_id, "add_charge", |folio| {
                FolioLedger::post_charge(folio, input.clone(), actor.user_id, now)
            })
            .await?;
        info!(
            %tenant_id,
            %folio_id,
            charge_id = %charge.id,
            line_total = %charge.line_total,
            balance = %folio.balance,
            "charge posted"
        );
        Ok((folio, charge))
    }

    /// Posts the stay's room-rate charge unless the folio already carries one.
    ///
    /// The check runs inside the conditional write, so concurrent check-ins
    /// cannot both post it.
    pub async fn post_room_rate_once(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        folio_id: FolioId,
        total_rate: Decimal,
    ) -> Result<Folio, FolioError> {
        let now = self.clock.now();
        let (folio, posted) = self
            .mutate(tenant_id, folio_id, "room_rate", |folio| {
                if folio.has_room_rate_charge() {
                    return Ok(None);
                }
                let input = NewCharge {
                    description: ROOM_RATE_DESCRIPTION.to_string(),
                    category: ChargeCategory::RoomRate,
                    unit_amount: total_rate,
                    quantity: 1,
                    tax_rate: None,
                };
                FolioLedger::post_charge(folio, input, actor.user_id, now).map(Some)
            })
            .await?;
        if let Some(charge) = posted {
            info!(%tenant_id, %folio_id, amount = %charge.line_total, "room rate posted");
        }
        Ok(folio)
    }

    /// Records a payment.
    pub async fn record_payment(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        folio_id: FolioId,
        input: NewPayment,
    ) -> Result<(Folio, Payment), FolioError> {
        FolioLedger::validate_payment(&input)?;
        let now = self.clock.now();
        let (folio, payment) = self
            .mutate(tenant_id, folio_id, "record_payment", |folio| {
                FolioLedger::post_payment(folio, input.clone(), actor.user_id, now)
            })
            .await?;
        info!(
            %tenant_id,
            %folio_id,
            payment_id = %payment.id,
            amount = %payment.amount,
            method = payment.method.as_str(),
            balance = %folio.balance,
            "payment recorded"
        );
        Ok((folio, payment))
    }

    /// Refunds a completed payment.
    pub async fn refund_payment(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        folio_id: FolioId,
        payment_id: PaymentId,
        reason: &str,
    ) -> Result<(Folio, Payment), FolioError> {
        self.reverse(tenant_id, actor, folio_id, payment_id, PaymentStatus::Refunded, reason)
            .await
    }

    /// Voids a completed payment recorded in error.
    pub async fn void_payment(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        folio_id: FolioId,
        payment_id: PaymentId,
        reason: &str,
    ) -> Result<(Folio, Payment), FolioError> {
        self.reverse(tenant_id, actor, folio_id, payment_id, PaymentStatus::Voided, reason)
            .await
    }

    /// Closes a folio. An unsettled balance needs `manager_override` from an
    /// elevated role.
    pub async fn close(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        folio_id: FolioId,
        manager_override: bool,
    ) -> Result<Folio, FolioError> {
        if manager_override && !actor.is_elevated() {
            return Err(FolioError::OverrideNotPermitted);
        }
        let epsilon = self.settings.balance_epsilon;
        let now = self.clock.now();
        let (folio, ()) = self
            .mutate(tenant_id, folio_id, "close", |folio| {
                FolioLedger::close(folio, epsilon, manager_override, actor.user_id, now)
            })
            .await?;

        info!(%tenant_id, %folio_id, balance = %folio.balance, manager_override, "folio closed");
        self.events.publish(
            tenant_id,
            now,
            DomainEvent::FolioClosed {
                folio_id,
                stay_id: folio.stay_id,
                balance: folio.balance,
            },
        );
        Ok(folio)
    }

    /// Voids a folio. Managers and admins only; a reason is mandatory.
    pub async fn void(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        folio_id: FolioId,
        reason: &str,
    ) -> Result<Folio, FolioError> {
        if !actor.is_elevated() {
            return Err(FolioError::VoidNotPermitted);
        }
        if reason.trim().is_empty() {
            return Err(FolioError::MissingReason);
        }
        let now = self.clock.now();
        let (folio, ()) = self
            .mutate(tenant_id, folio_id, "void", |folio| {
                FolioLedger::void(folio, reason, actor.user_id, now)
            })
            .await?;

        warn!(%tenant_id, %folio_id, user_id = %actor.user_id, reason, "folio voided");
        self.events.publish(
            tenant_id,
            now,
            DomainEvent::FolioVoided {
                folio_id,
                stay_id: folio.stay_id,
                reason: reason.trim().to_string(),
            },
        );
        Ok(folio)
    }

    async fn reverse(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        folio_id: FolioId,
        payment_id: PaymentId,
        outcome: PaymentStatus,
        reason: &str,
    ) -> Result<(Folio, Payment), FolioError> {
        let now = self.clock.now();
        let (folio, payment) = self
            .mutate(tenant_id, folio_id, "reverse_payment", |folio| {
                FolioLedger::reverse_payment(folio, payment_id, outcome, reason, actor.user_id, now)
            })
            .await?;
        info!(
            %tenant_id,
            %folio_id,
            %payment_id,
            outcome = ?outcome,
            balance = %folio.balance,
            "payment reversed"
        );
        Ok((folio, payment))
    }

    /// Read, apply, verify, conditionally write; retried on version conflicts.
    async fn mutate<T, F>(
        &self,
        tenant_id: TenantId,
        folio_id: FolioId,
        action: &'static str,
        mut apply: F,
    ) -> Result<(Folio, T), FolioError>
    where
        F: FnMut(&mut Folio) -> Result<T, FolioError> + Send,
        T: Send,
    {
        for attempt in 0..=self.settings.max_commit_retries {
            let current = self.get(tenant_id, folio_id).await?;
            let mut next = current.clone();
            let output = apply(&mut next)?;
            if next == current {
                return Ok((current, output));
            }

            if let Err(e) = FolioLedger::verify(&next) {
                error!(
                    %tenant_id,
                    %folio_id,
                    action,
                    before = ?current.snapshot(),
                    after = ?next.snapshot(),
                    error = %e,
                    "folio ledger integrity check failed"
                );
                return Err(e);
            }

            match self.folios.update(next, current.version).await {
                Ok(saved) => return Ok((saved, output)),
                Err(e) if e.is_version_conflict() => {
                    warn!(%tenant_id, %folio_id, action, attempt, "folio write lost a race, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(FolioError::ConcurrentModification(folio_id))
    }
}
