//! Property-based tests for DepositResolver.
//!
//! - Property 1: Clamped amounts stay inside the policy bounds
//! - Property 2: Amounts are always rounded to minor units
//! - Property 3: Triggers never change the amount

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use innkeep_shared::types::{DepositPolicyId, RoomCategoryId, TenantId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::resolver::DepositResolver;
use super::types::{DepositContext, DepositPolicy, DepositType};
use crate::calendar::DateRange;

/// Strategy for stay totals (0.01 to 1,000,000.00).
fn total_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for percentages with up to three decimals (0 to 100).
fn percentage() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000i64).prop_map(|v| Decimal::new(v, 3))
}

fn deposit_type() -> impl Strategy<Value = DepositType> {
    prop_oneof![
        Just(DepositType::Percentage),
        Just(DepositType::FixedAmount),
        Just(DepositType::Nights),
        Just(DepositType::Custom),
    ]
}

fn stay_dates() -> impl Strategy<Value = DateRange> {
    (0i64..365, 1i64..30).prop_map(|(offset, nights)| {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(offset);
        DateRange::new(start, start + Duration::days(nights)).unwrap()
    })
}

fn make_policy(deposit_type: DepositType, value: Decimal) -> DepositPolicy {
    DepositPolicy {
        id: DepositPolicyId::new(),
        tenant_id: TenantId::new(),
        name: "Prop".to_string(),
        category_id: None,
        rate_plan_id: None,
        applies_to_all_rooms: true,
        deposit_type,
        value,
        custom_amount: Some(value),
        min_deposit_amount: None,
        max_deposit_amount: None,
        requires_for_weekends: false,
        requires_for_holidays: false,
        requires_for_peak_season: false,
        priority: 0,
        is_active: true,
        created_by: UserId::new(),
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn make_ctx(dates: DateRange, total_rate: Decimal) -> DepositContext {
    DepositContext {
        category_id: RoomCategoryId::new(),
        rate_plan_id: None,
        dates,
        total_rate,
        holidays: vec![],
        peak_season: false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property 1: *For any* policy with `min <= max`, the amount lies in `[min, max]`.
    #[test]
    fn prop_amount_within_clamp(
        deposit_type in deposit_type(),
        value in percentage(),
        total in total_rate(),
        dates in stay_dates(),
        min_cents in 0i64..500_000,
        span_cents in 0i64..500_000,
    ) {
        let min = Decimal::new(min_cents, 2);
        let max = Decimal::new(min_cents + span_cents, 2);
        let mut policy = make_policy(deposit_type, value);
        policy.min_deposit_amount = Some(min);
        policy.max_deposit_amount = Some(max);

        let amount = DepositResolver::amount(&policy, &make_ctx(dates, total));
        prop_assert!(amount >= min, "{} < min {}", amount, min);
        prop_assert!(amount <= max, "{} > max {}", amount, max);
    }

    /// Property 2: *For any* policy, the amount has at most two decimals.
    #[test]
    fn prop_amount_is_rounded(
        deposit_type in deposit_type(),
        value in percentage(),
        total in total_rate(),
        dates in stay_dates(),
    ) {
        let amount = DepositResolver::amount(&make_policy(deposit_type, value), &make_ctx(dates, total));
        prop_assert_eq!(amount, amount.round_dp(2));
        prop_assert!(amount >= Decimal::ZERO);
    }

    /// Property 3: *For any* context, toggling triggers never changes the amount.
    #[test]
    fn prop_triggers_do_not_change_amount(
        value in percentage(),
        total in total_rate(),
        dates in stay_dates(),
        peak in any::<bool>(),
    ) {
        let plain = make_policy(DepositType::Percentage, value);
        let mut triggered = plain.clone();
        triggered.requires_for_weekends = true;
        triggered.requires_for_holidays = true;
        triggered.requires_for_peak_season = true;

        let mut ctx = make_ctx(dates, total);
        ctx.peak_season = peak;
        ctx.holidays = vec![dates.start()];

        prop_assert_eq!(
            DepositResolver::amount(&plain, &ctx),
            DepositResolver::amount(&triggered, &ctx)
        );
        prop_assert!(DepositResolver::is_required(&triggered, &ctx));
    }
}
