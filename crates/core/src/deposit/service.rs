//! Deposit policy management, quoting and deposit payments.

use std::sync::Arc;

use innkeep_shared::types::{DepositPaymentId, DepositPolicyId, StayId, TenantId};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::error::DepositError;
use super::resolver::DepositResolver;
use super::types::{
    DepositContext, DepositPayment, DepositPaymentStatus, DepositPolicy, DepositQuote, DepositSummary,
    NewDepositPolicy,
};
use crate::actor::Actor;
use crate::clock::Clock;
use crate::events::{DomainEvent, EventPublisher};
use crate::folio::NewPayment;
use crate::repository::{DepositRepository, RepositoryError, StayRepository};
use crate::settings::CoreSettings;

/// Deposit policies, quotes and deposit payments.
pub struct DepositService {
    deposits: Arc<dyn DepositRepository>,
    stays: Arc<dyn StayRepository>,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
    settings: CoreSettings,
}

impl DepositService {
    /// Creates the service.
    pub fn new(
        deposits: Arc<dyn DepositRepository>,
        stays: Arc<dyn StayRepository>,
        events: EventPublisher,
        clock: Arc<dyn Clock>,
        settings: CoreSettings,
    ) -> Self {
        Self {
            deposits,
            stays,
            events,
            clock,
            settings,
        }
    }

    /// Creates a policy. Managers and admins only.
    pub async fn create_policy(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        input: NewDepositPolicy,
    ) -> Result<DepositPolicy, DepositError> {
        if !actor.is_elevated() {
            return Err(DepositError::NotPermitted);
        }
        DepositResolver::validate(&input)?;

        let name = input.name.trim().to_string();
        let policy = DepositPolicy {
            id: DepositPolicyId::new(),
            tenant_id,
            name: name.clone(),
            category_id: input.category_id,
            rate_plan_id: input.rate_plan_id,
            applies_to_all_rooms: input.applies_to_all_rooms,
            deposit_type: input.deposit_type,
            value: input.value,
            custom_amount: input.custom_amount,
            min_deposit_amount: input.min_deposit_amount,
            max_deposit_amount: input.max_deposit_amount,
            requires_for_weekends: input.requires_for_weekends,
            requires_for_holidays: input.requires_for_holidays,
            requires_for_peak_season: input.requires_for_peak_season,
            priority: input.priority,
            is_active: input.is_active,
            created_by: actor.user_id,
            created_at: self.clock.now(),
        };

        let saved = self.deposits.insert_policy(policy).await.map_err(|e| match e {
            RepositoryError::AlreadyExists { .. } => DepositError::DuplicatePolicyName(name),
            other => other.into(),
        })?;
        info!(%tenant_id, policy_id = %saved.id, name = %saved.name, "deposit policy created");
        Ok(saved)
    }

    /// Lists the tenant's policies.
    pub async fn list_policies(&self, tenant_id: TenantId) -> Result<Vec<DepositPolicy>, DepositError> {
        let mut policies = self.deposits.list_policies(tenant_id).await?;
        policies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(policies)
    }

    /// Resolves the deposit for a prospective or existing stay.
    pub async fn quote(&self, tenant_id: TenantId, ctx: &DepositContext) -> Result<DepositQuote, DepositError> {
        let policies = self.deposits.list_policies(tenant_id).await?;
        Ok(DepositResolver::quote(&policies, ctx))
    }

    /// Records a deposit received for a confirmed or in-house stay.
    pub async fn record_payment(
        &self,
        tenant_id: TenantId,
        actor: &Actor,
        stay_id: StayId,
        input: NewPayment,
    ) -> Result<DepositPayment, DepositError> {
        if input.amount <= Decimal::ZERO {
            return Err(DepositError::Validation("amount must be positive".into()));
        }
        let stay = self
            .stays
            .get(tenant_id, stay_id)
            .await?
            .ok_or(DepositError::StayNotFound(stay_id))?;
        if !stay.is_active() {
            return Err(DepositError::StayNotActive(stay_id));
        }

        let payment = DepositPayment {
            id: DepositPaymentId::new(),
            tenant_id,
            stay_id,
            amount: input.amount,
            method: input.method,
            status: DepositPaymentStatus::Received,
            reference: input.reference,
            received_at: self.clock.now(),
            received_by: actor.user_id,
            refunded_amount: Decimal::ZERO,
            refund_reason: None,
            refunded_at: None,
            version: 0,
        };
        let saved = self.deposits.save_payment(payment, None).await?;

        info!(%tenant_id, %stay_id, payment_id = %saved.id, amount = %saved.amount, "deposit received");
        self.events.publish(
            tenant_id,
            saved.received_at,
            DomainEvent::DepositReceived {
                stay_id,
                payment_id: saved.id,
                amount: saved.amount,
            },
        );
        Ok(saved)
    }

    /// Refunds part or all of what a deposit payment still holds.
    pub async fn refund_payment(
        &self,
        tenant_id: TenantId,
        payment_id: DepositPaymentId,
        amount: Decimal,
        reason: &str,
    ) -> Result<DepositPayment, DepositError> {
        if amount <= Decimal::ZERO {
            return Err(DepositError::Validation("refund amount must be positive".into()));
        }
        if reason.trim().is_empty() {
            return Err(DepositError::Validation("a refund reason is required".into()));
        }

        for attempt in 0..=self.settings.max_commit_retries {
            let current = self
                .deposits
                .get_payment(tenant_id, payment_id)
                .await?
                .ok_or(DepositError::PaymentNotFound(payment_id))?;
            if amount > current.held() {
                return Err(DepositError::RefundExceedsHeld {
                    requested: amount,
                    held: current.held(),
                });
            }

            let mut next = current.clone();
            next.refunded_amount += amount;
            next.status = if next.held().is_zero() {
                DepositPaymentStatus::Refunded
            } else {
                DepositPaymentStatus::PartiallyRefunded
            };
            next.refund_reason = Some(reason.trim().to_string());
            next.refunded_at = Some(self.clock.now());

            match self.deposits.save_payment(next, Some(current.version)).await {
                Ok(saved) => {
                    info!(
                        %tenant_id,
                        %payment_id,
                        refunded = %amount,
                        status = ?saved.status,
                        "deposit refunded"
                    );
                    return Ok(saved);
                }
                Err(e) if e.is_version_conflict() => {
                    warn!(%tenant_id, %payment_id, attempt, "deposit refund lost a race, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(DepositError::ConcurrentModification(payment_id))
    }

    /// Lists the deposit payments of a stay.
    pub async fn list_payments(
        &self,
        tenant_id: TenantId,
        stay_id: StayId,
    ) -> Result<Vec<DepositPayment>, DepositError> {
        Ok(self.deposits.list_payments(tenant_id, stay_id).await?)
    }

    /// Sum of deposit money still held for a stay.
    pub async fn deposit_paid(&self, tenant_id: TenantId, stay_id: StayId) -> Result<Decimal, DepositError> {
        let payments = self.deposits.list_payments(tenant_id, stay_id).await?;
        Ok(payments.iter().map(DepositPayment::held).sum())
    }

    /// Quoted vs paid deposit of a stay.
    pub async fn summary(&self, tenant_id: TenantId, stay_id: StayId) -> Result<DepositSummary, DepositError> {
        let stay = self
            .stays
            .get(tenant_id, stay_id)
            .await?
            .ok_or(DepositError::StayNotFound(stay_id))?;
        let paid = self.deposit_paid(tenant_id, stay_id).await?;
        Ok(DepositSummary {
            stay_id,
            quoted: stay.deposit_amount,
            required: stay.deposit_required,
            paid,
            outstanding: (stay.deposit_amount - paid).max(Decimal::ZERO),
        })
    }
}
