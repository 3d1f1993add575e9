//! Property-based tests for FolioLedger.
//!
//! - Property 1: `balance == total_charges - total_payments` after any sequence
//! - Property 2: Rejected operations leave the folio unchanged
//! - Property 3: Line totals are rounded to minor units

use chrono::Utc;
use innkeep_shared::types::{StayId, TenantId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::ledger::FolioLedger;
use super::types::{ChargeCategory, Folio, NewCharge, NewPayment, PaymentMethod, PaymentStatus};

/// Strategy for amounts from 0.01 to 10,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for tax rates from 0 to 100 with two decimals.
fn tax_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|v| Decimal::new(v, 2))
}

#[derive(Debug, Clone)]
enum Op {
    Charge(Decimal, u32, Decimal),
    Pay(Decimal),
    Refund(usize),
    Void(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (amount(), 1u32..5, tax_rate()).prop_map(|(a, q, t)| Op::Charge(a, q, t)),
        amount().prop_map(Op::Pay),
        (0usize..8).prop_map(Op::Refund),
        (0usize..8).prop_map(Op::Void),
    ]
}

fn apply(folio: &mut Folio, op: &Op) {
    let user = UserId::new();
    let now = Utc::now();
    let payment_at = |folio: &Folio, i: usize| folio.payments.get(i).map(|p| p.id);
    let _ = match op {
        Op::Charge(unit, qty, tax) => FolioLedger::post_charge(
            folio,
            NewCharge {
                description: "Item".to_string(),
                category: ChargeCategory::Other,
                unit_amount: *unit,
                quantity: *qty,
                tax_rate: Some(*tax),
            },
            user,
            now,
        )
        .map(|_| ()),
        Op::Pay(amount) => FolioLedger::post_payment(
            folio,
            NewPayment {
                amount: *amount,
                method: PaymentMethod::Card,
                reference: None,
            },
            user,
            now,
        )
        .map(|_| ()),
        Op::Refund(i) => match payment_at(folio, *i) {
            Some(id) => FolioLedger::reverse_payment(folio, id, PaymentStatus::Refunded, "refund", user, now).map(|_| ()),
            None => Ok(()),
        },
        Op::Void(i) => match payment_at(folio, *i) {
            Some(id) => FolioLedger::reverse_payment(folio, id, PaymentStatus::Voided, "void", user, now).map(|_| ()),
            None => Ok(()),
        },
    };
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property 1: *For any* sequence of operations the ledger verifies.
    #[test]
    fn prop_balance_identity_holds(ops in prop::collection::vec(op(), 0..30)) {
        let mut folio = Folio::open(TenantId::new(), StayId::new(), UserId::new(), Utc::now());
        for op in &ops {
            apply(&mut folio, op);
            prop_assert_eq!(folio.balance, folio.total_charges - folio.total_payments);
            prop_assert!(FolioLedger::verify(&folio).is_ok());
        }
    }

    /// Property 2: *For any* closed folio, posting fails and changes nothing.
    #[test]
    fn prop_closed_folio_is_frozen(ops in prop::collection::vec(op(), 0..10), next in op()) {
        let mut folio = Folio::open(TenantId::new(), StayId::new(), UserId::new(), Utc::now());
        for op in &ops {
            apply(&mut folio, op);
        }
        FolioLedger::close(&mut folio, Decimal::new(1, 2), true, UserId::new(), Utc::now()).unwrap();
        let frozen = folio.clone();
        apply(&mut folio, &next);
        prop_assert_eq!(folio, frozen);
    }

    /// Property 3: *For any* charge the line total has at most two decimals.
    #[test]
    fn prop_line_total_rounded(unit in amount(), qty in 1u32..100, tax in tax_rate()) {
        let total = FolioLedger::line_total(unit, qty, tax);
        prop_assert_eq!(total, total.round_dp(2));
        prop_assert!(total >= unit * Decimal::from(qty));
    }
}
