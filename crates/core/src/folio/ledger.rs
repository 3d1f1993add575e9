//! Pure folio ledger arithmetic and state transitions.
//!
//! Every function here mutates an in-memory [`Folio`]; the service persists
//! the result with one conditional write, so items and totals never diverge
//! in storage.

use chrono::{DateTime, Utc};
use innkeep_shared::types::{ChargeId, PaymentId, UserId, round_money};
use rust_decimal::Decimal;

use super::error::FolioError;
use super::types::{
    Charge, Folio, FolioAuditEntry, FolioSnapshot, FolioStatus, NewCharge, NewPayment, Payment,
    PaymentStatus,
};

/// Stateless folio ledger.
pub struct FolioLedger;

impl FolioLedger {
    /// `round2(unit × qty × (1 + tax/100))`.
    #[must_use]
    pub fn line_total(unit_amount: Decimal, quantity: u32, tax_rate: Decimal) -> Decimal {
        let gross = unit_amount * Decimal::from(quantity);
        round_money(gross + gross * tax_rate / Decimal::ONE_HUNDRED)
    }

    /// Validates a charge.
    pub fn validate_charge(input: &NewCharge) -> Result<(), FolioError> {
        if input.description.trim().is_empty() {
            return Err(FolioError::EmptyDescription);
        }
        if input.quantity < 1 {
            return Err(FolioError::InvalidQuantity(input.quantity));
        }
        if input.unit_amount < Decimal::ZERO {
            return Err(FolioError::NegativeUnitAmount);
        }
        if let Some(tax) = input.tax_rate
            && (tax < Decimal::ZERO || tax > Decimal::ONE_HUNDRED)
        {
            return Err(FolioError::InvalidTaxRate(tax));
        }
        Ok(())
    }

    /// Validates a payment.
    pub fn validate_payment(input: &NewPayment) -> Result<(), FolioError> {
        if input.amount <= Decimal::ZERO {
            return Err(FolioError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Fails unless the folio is open.
    pub fn ensure_open(folio: &Folio) -> Result<(), FolioError> {
        if folio.is_open() {
            Ok(())
        } else {
            Err(FolioError::NotOpen {
                folio_id: folio.id,
                status: folio.status,
            })
        }
    }

    /// Posts a charge and moves the totals with it.
    pub fn post_charge(
        folio: &mut Folio,
        input: NewCharge,
        posted_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Charge, FolioError> {
        Self::ensure_open(folio)?;
        Self::validate_charge(&input)?;

        let tax_rate = input.tax_rate.unwrap_or(Decimal::ZERO);
        let charge = Charge {
            id: ChargeId::new(),
            description: input.description.trim().to_string(),
            category: input.category,
            unit_amount: input.unit_amount,
            quantity: input.quantity,
            tax_rate,
            line_total: Self::line_total(input.unit_amount, input.quantity, tax_rate),
            posted_at: at,
            posted_by,
        };
        folio.total_charges += charge.line_total;
        folio.balance += charge.line_total;
        folio.charges.push(charge.clone());
        Ok(charge)
    }

    /// Records a completed payment and moves the totals with it.
    pub fn post_payment(
        folio: &mut Folio,
        input: NewPayment,
        received_by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Payment, FolioError> {
        Self::ensure_open(folio)?;
        Self::validate_payment(&input)?;

        let payment = Payment {
            id: PaymentId::new(),
            amount: input.amount,
            method: input.method,
            status: PaymentStatus::Completed,
            reference: input.reference,
            received_at: at,
            received_by,
            reversed_at: None,
            reversal_reason: None,
        };
        folio.total_payments += payment.amount;
        folio.balance -= payment.amount;
        folio.payments.push(payment.clone());
        Ok(payment)
    }

    /// Takes a completed payment back out of the totals (refund or void).
    ///
    /// The balance may go negative; a credit owed is never clamped.
    pub fn reverse_payment(
        folio: &mut Folio,
        payment_id: PaymentId,
        outcome: PaymentStatus,
        reason: &str,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<Payment, FolioError> {
        Self::ensure_open(folio)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(FolioError::MissingReason);
        }

        let before = folio.snapshot();
        let payment = folio
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or(FolioError::PaymentNotFound(payment_id))?;
        if !payment.is_completed() {
            return Err(FolioError::PaymentNotCompleted(payment_id));
        }

        payment.status = outcome;
        payment.reversed_at = Some(at);
        payment.reversal_reason = Some(reason.to_string());
        let reversed = payment.clone();

        folio.total_payments -= reversed.amount;
        folio.balance += reversed.amount;
        let action = match outcome {
            PaymentStatus::Refunded => "payment_refund",
            _ => "payment_void",
        };
        Self::record(folio, action, actor, at, Some(reason.to_string()), before);
        Ok(reversed)
    }

    /// Closes the folio. Unsettled balances need `allow_unsettled`.
    pub fn close(
        folio: &mut Folio,
        epsilon: Decimal,
        allow_unsettled: bool,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), FolioError> {
        Self::ensure_open(folio)?;
        let settled = folio.balance.abs() < epsilon;
        if !settled && !allow_unsettled {
            return Err(FolioError::BalanceNotSettled {
                balance: folio.balance,
            });
        }

        let before = folio.snapshot();
        folio.status = FolioStatus::Closed;
        folio.closed_at = Some(at);
        if !settled {
            Self::record(folio, "close_override", actor, at, None, before);
        }
        Ok(())
    }

    /// Voids the folio and records a before/after snapshot.
    pub fn void(folio: &mut Folio, reason: &str, actor: UserId, at: DateTime<Utc>) -> Result<(), FolioError> {
        Self::ensure_open(folio)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(FolioError::MissingReason);
        }

        let before = folio.snapshot();
        folio.status = FolioStatus::Voided;
        folio.voided_at = Some(at);
        folio.void_reason = Some(reason.to_string());
        Self::record(folio, "void", actor, at, Some(reason.to_string()), before);
        Ok(())
    }

    /// Checks items against totals and totals against the balance.
    pub fn verify(folio: &Folio) -> Result<(), FolioError> {
        let charges: Decimal = folio.charges.iter().map(|c| c.line_total).sum();
        let payments: Decimal = folio
            .payments
            .iter()
            .filter(|p| p.is_completed())
            .map(|p| p.amount)
            .sum();

        let mismatch = |detail: String| FolioError::LedgerMismatch {
            folio_id: folio.id,
            detail,
        };
        if charges != folio.total_charges {
            return Err(mismatch(format!(
                "charges sum to {charges} but total_charges is {}",
                folio.total_charges
            )));
        }
        if payments != folio.total_payments {
            return Err(mismatch(format!(
                "payments sum to {payments} but total_payments is {}",
                folio.total_payments
            )));
        }
        if folio.balance != folio.total_charges - folio.total_payments {
            return Err(mismatch(format!(
                "balance {} != {} - {}",
                folio.balance, folio.total_charges, folio.total_payments
            )));
        }
        Ok(())
    }

    fn record(
        folio: &mut Folio,
        action: &str,
        actor: UserId,
        at: DateTime<Utc>,
        reason: Option<String>,
        before: FolioSnapshot,
    ) {
        let after = folio.snapshot();
        folio.audit_trail.push(FolioAuditEntry {
            action: action.to_string(),
            actor,
            at,
            reason,
            before,
            after,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folio::types::{ChargeCategory, PaymentMethod};
    use innkeep_shared::types::{BALANCE_EPSILON, StayId, TenantId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn folio() -> Folio {
        Folio::open(TenantId::new(), StayId::new(), UserId::new(), Utc::now())
    }

    fn charge(description: &str, unit: Decimal, quantity: u32, tax: Option<Decimal>) -> NewCharge {
        NewCharge {
            description: description.into(),
            category: ChargeCategory::FoodBeverage,
            unit_amount: unit,
            quantity,
            tax_rate: tax,
        }
    }

    fn cash(amount: Decimal) -> NewPayment {
        NewPayment {
            amount,
            method: PaymentMethod::Cash,
            reference: None,
        }
    }

    #[rstest]
    #[case(dec!(1500), 2, dec!(5), dec!(3150.00))]
    #[case(dec!(50000), 1, dec!(0), dec!(50000.00))]
    #[case(dec!(9.99), 3, dec!(7.5), dec!(32.22))]
    #[case(dec!(0.005), 1, dec!(0), dec!(0.01))]
    fn test_line_total(#[case] unit: Decimal, #[case] qty: u32, #[case] tax: Decimal, #[case] expected: Decimal) {
        assert_eq!(FolioLedger::line_total(unit, qty, tax), expected);
    }

    #[test]
    fn test_room_rate_plus_minibar_then_settle() {
        let mut f = folio();
        let user = UserId::new();
        let now = Utc::now();
        let mut room = charge("Room rate", dec!(50000), 1, None);
        room.category = ChargeCategory::RoomRate;
        FolioLedger::post_charge(&mut f, room, user, now).unwrap();
        FolioLedger::post_charge(&mut f, charge("Dinner", dec!(1500), 2, Some(dec!(5))), user, now).unwrap();
        assert_eq!(f.total_charges, dec!(53150.00));
        assert_eq!(f.balance, dec!(53150.00));

        FolioLedger::post_payment(&mut f, cash(dec!(53150)), user, now).unwrap();
        assert_eq!(f.balance, dec!(0));
        FolioLedger::verify(&f).unwrap();

        FolioLedger::close(&mut f, BALANCE_EPSILON, false, user, now).unwrap();
        assert_eq!(f.status, FolioStatus::Closed);
        assert!(f.audit_trail.is_empty());
    }

    #[rstest]
    #[case(charge("  ", dec!(1), 1, None))]
    #[case(charge("Spa", dec!(1), 0, None))]
    #[case(charge("Spa", dec!(-1), 1, None))]
    #[case(charge("Spa", dec!(1), 1, Some(dec!(101))))]
    #[case(charge("Spa", dec!(1), 1, Some(dec!(-0.5))))]
    fn test_invalid_charges_leave_folio_untouched(#[case] input: NewCharge) {
        let mut f = folio();
        let before = f.clone();
        assert!(FolioLedger::post_charge(&mut f, input, UserId::new(), Utc::now()).is_err());
        assert_eq!(f, before);
    }

    #[test]
    fn test_closed_folio_rejects_items() {
        let mut f = folio();
        FolioLedger::close(&mut f, BALANCE_EPSILON, false, UserId::new(), Utc::now()).unwrap();
        let err = FolioLedger::post_payment(&mut f, cash(dec!(10)), UserId::new(), Utc::now()).unwrap_err();
        assert!(matches!(err, FolioError::NotOpen { status: FolioStatus::Closed, .. }));
    }

    #[test]
    fn test_close_requires_settled_balance_unless_allowed() {
        let mut f = folio();
        let user = UserId::new();
        FolioLedger::post_charge(&mut f, charge("Bar", dec!(10), 1, None), user, Utc::now()).unwrap();
        assert!(matches!(
            FolioLedger::close(&mut f, BALANCE_EPSILON, false, user, Utc::now()),
            Err(FolioError::BalanceNotSettled { .. })
        ));
        FolioLedger::close(&mut f, BALANCE_EPSILON, true, user, Utc::now()).unwrap();
        assert_eq!(f.audit_trail.len(), 1);
        assert_eq!(f.audit_trail[0].action, "close_override");
    }

    #[test]
    fn test_refund_can_leave_credit_balance() {
        let mut f = folio();
        let user = UserId::new();
        let p = FolioLedger::post_payment(&mut f, cash(dec!(200)), user, Utc::now()).unwrap();
        assert_eq!(f.balance, dec!(-200));

        let reversed =
            FolioLedger::reverse_payment(&mut f, p.id, PaymentStatus::Refunded, "Duplicate", user, Utc::now()).unwrap();
        assert_eq!(reversed.status, PaymentStatus::Refunded);
        assert_eq!(f.total_payments, dec!(0));
        assert_eq!(f.balance, dec!(0));
        FolioLedger::verify(&f).unwrap();

        let again = FolioLedger::reverse_payment(&mut f, p.id, PaymentStatus::Voided, "Again", user, Utc::now());
        assert!(matches!(again, Err(FolioError::PaymentNotCompleted(_))));
    }

    #[test]
    fn test_void_records_snapshot() {
        let mut f = folio();
        let user = UserId::new();
        FolioLedger::post_charge(&mut f, charge("Bar", dec!(10), 1, None), user, Utc::now()).unwrap();
        assert!(matches!(
            FolioLedger::void(&mut f, "", user, Utc::now()),
            Err(FolioError::MissingReason)
        ));
        FolioLedger::void(&mut f, "Guest walked", user, Utc::now()).unwrap();

        let entry = &f.audit_trail[0];
        assert_eq!(entry.before.status, FolioStatus::Open);
        assert_eq!(entry.after.status, FolioStatus::Voided);
        assert_eq!(entry.after.balance, dec!(10.00));
        assert!(FolioLedger::void(&mut f, "twice", user, Utc::now()).is_err());
    }

    #[test]
    fn test_verify_detects_drift() {
        let mut f = folio();
        FolioLedger::post_charge(&mut f, charge("Bar", dec!(10), 1, None), UserId::new(), Utc::now()).unwrap();
        f.balance = dec!(9);
        assert!(matches!(FolioLedger::verify(&f), Err(FolioError::LedgerMismatch { .. })));
    }
}
