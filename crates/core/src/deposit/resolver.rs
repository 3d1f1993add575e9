//! Pure deposit policy resolution.

use std::cmp::Reverse;

use innkeep_shared::types::{percent_of, round_money};
use rust_decimal::Decimal;

use super::error::DepositError;
use super::types::{
    DepositContext, DepositPolicy, DepositQuote, DepositType, NewDepositPolicy, PolicyScope,
};

/// Longest accepted policy name.
pub const MAX_POLICY_NAME_LEN: usize = 120;

/// Stateless deposit calculator.
pub struct DepositResolver;

impl DepositResolver {
    /// Returns true when `policy` applies to the stay described by `ctx`.
    #[must_use]
    pub fn matches(policy: &DepositPolicy, ctx: &DepositContext) -> bool {
        if !policy.is_active {
            return false;
        }
        let category = policy.category_id == Some(ctx.category_id);
        let rate_plan = policy.rate_plan_id.is_some() && policy.rate_plan_id == ctx.rate_plan_id;
        match policy.scope() {
            Some(PolicyScope::CategoryAndRatePlan) => category && rate_plan,
            Some(PolicyScope::Category) => category,
            Some(PolicyScope::RatePlan) => rate_plan,
            Some(PolicyScope::Default) => true,
            None => false,
        }
    }

    /// Picks the most specific matching policy.
    ///
    /// Tier order is category+rate plan, category, rate plan, default. Within
    /// a tier the higher priority wins, then the earliest created.
    #[must_use]
    pub fn select<'a>(policies: &'a [DepositPolicy], ctx: &DepositContext) -> Option<&'a DepositPolicy> {
        policies
            .iter()
            .filter(|p| Self::matches(p, ctx))
            .min_by_key(|p| (p.scope(), Reverse(p.priority), p.created_at, p.id))
    }

    /// Computes the policy amount: raw by type, clamped, then rounded half-up.
    #[must_use]
    pub fn amount(policy: &DepositPolicy, ctx: &DepositContext) -> Decimal {
        let raw = match policy.deposit_type {
            DepositType::Percentage => percent_of(ctx.total_rate, policy.value),
            DepositType::FixedAmount => policy.value,
            DepositType::Nights => {
                let nights = Decimal::from(ctx.dates.nights());
                ctx.total_rate / nights * policy.value
            }
            DepositType::Custom => policy.custom_amount.unwrap_or(Decimal::ZERO),
        };

        let mut clamped = raw;
        if let Some(min) = policy.min_deposit_amount {
            clamped = clamped.max(min);
        }
        if let Some(max) = policy.max_deposit_amount {
            clamped = clamped.min(max);
        }
        round_money(clamped)
    }

    /// Whether the deposit is mandatory. Triggers never change the amount.
    #[must_use]
    pub fn is_required(policy: &DepositPolicy, ctx: &DepositContext) -> bool {
        let weekend = ctx.dates.includes_weekend_night();
        let holiday = ctx.holidays.iter().any(|h| ctx.dates.contains_night(*h));

        policy.applies_to_all_rooms
            || (weekend && policy.requires_for_weekends)
            || (holiday && policy.requires_for_holidays)
            || (ctx.peak_season && policy.requires_for_peak_season)
    }

    /// Resolves the deposit for a stay.
    #[must_use]
    pub fn quote(policies: &[DepositPolicy], ctx: &DepositContext) -> DepositQuote {
        Self::select(policies, ctx).map_or_else(DepositQuote::none, |policy| DepositQuote {
            amount: Self::amount(policy, ctx),
            required: Self::is_required(policy, ctx),
            policy_id: Some(policy.id),
            policy_name: Some(policy.name.clone()),
        })
    }

    /// Validates a new policy.
    pub fn validate(input: &NewDepositPolicy) -> Result<(), DepositError> {
        let name = input.name.trim();
        if name.is_empty() || name.len() > MAX_POLICY_NAME_LEN {
            return Err(DepositError::Validation(format!(
                "name must be 1-{MAX_POLICY_NAME_LEN} characters"
            )));
        }

        let amounts = [
            ("value", Some(input.value)),
            ("custom_amount", input.custom_amount),
            ("min_deposit_amount", input.min_deposit_amount),
            ("max_deposit_amount", input.max_deposit_amount),
        ];
        for (field, amount) in amounts {
            if amount.is_some_and(|a| a < Decimal::ZERO) {
                return Err(DepositError::Validation(format!("{field} must not be negative")));
            }
        }

        if let (Some(min), Some(max)) = (input.min_deposit_amount, input.max_deposit_amount)
            && min > max
        {
            return Err(DepositError::Validation(format!(
                "min_deposit_amount {min} exceeds max_deposit_amount {max}"
            )));
        }

        match input.deposit_type {
            DepositType::Percentage if input.value > Decimal::ONE_HUNDRED => Err(
                DepositError::Validation("percentage must be between 0 and 100".into()),
            ),
            DepositType::Custom if input.custom_amount.is_none() => Err(DepositError::Validation(
                "custom policies need a custom_amount".into(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, range};
    use chrono::{Duration, TimeZone, Utc};
    use innkeep_shared::types::{DepositPolicyId, RatePlanId, RoomCategoryId, TenantId, UserId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn policy(name: &str, deposit_type: DepositType, value: Decimal) -> DepositPolicy {
        DepositPolicy {
            id: DepositPolicyId::new(),
            tenant_id: TenantId::new(),
            name: name.into(),
            category_id: None,
            rate_plan_id: None,
            applies_to_all_rooms: true,
            deposit_type,
            value,
            custom_amount: None,
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

    // Mon 2025-02-03 .. Thu 2025-02-06: no weekend nights.
    fn weekday_ctx(category_id: RoomCategoryId) -> DepositContext {
        DepositContext {
            category_id,
            rate_plan_id: None,
            dates: range((2025, 2, 3), (2025, 2, 6)),
            total_rate: dec!(50000),
            holidays: vec![],
            peak_season: false,
        }
    }

    #[test]
    fn test_default_percentage_policy() {
        // 2025-02-01 is a Saturday; default policies are mandatory anyway.
        let ctx = DepositContext {
            dates: range((2025, 2, 1), (2025, 2, 4)),
            ..weekday_ctx(RoomCategoryId::new())
        };
        let quote = DepositResolver::quote(&[policy("Default", DepositType::Percentage, dec!(10))], &ctx);
        assert_eq!(quote.amount, dec!(5000.00));
        assert!(quote.required);
        assert_eq!(quote.policy_name.as_deref(), Some("Default"));
    }

    #[test]
    fn test_max_clamp() {
        let mut p = policy("Capped", DepositType::Percentage, dec!(10));
        p.max_deposit_amount = Some(dec!(3000));
        let quote = DepositResolver::quote(&[p], &weekday_ctx(RoomCategoryId::new()));
        assert_eq!(quote.amount, dec!(3000.00));
    }

    #[test]
    fn test_min_clamp() {
        let mut p = policy("Floor", DepositType::FixedAmount, dec!(100));
        p.min_deposit_amount = Some(dec!(250));
        assert_eq!(DepositResolver::amount(&p, &weekday_ctx(RoomCategoryId::new())), dec!(250.00));
    }

    #[rstest]
    #[case(DepositType::FixedAmount, dec!(1200), None, dec!(1200.00))]
    #[case(DepositType::Nights, dec!(1), None, dec!(16666.67))]
    #[case(DepositType::Nights, dec!(2), None, dec!(33333.33))]
    #[case(DepositType::Custom, dec!(0), Some(dec!(777.777)), dec!(777.78))]
    #[case(DepositType::Percentage, dec!(12.5), None, dec!(6250.00))]
    fn test_amount_by_type(
        #[case] deposit_type: DepositType,
        #[case] value: Decimal,
        #[case] custom: Option<Decimal>,
        #[case] expected: Decimal,
    ) {
        let mut p = policy("P", deposit_type, value);
        p.custom_amount = custom;
        assert_eq!(DepositResolver::amount(&p, &weekday_ctx(RoomCategoryId::new())), expected);
    }

    #[test]
    fn test_no_match_quotes_zero() {
        let mut p = policy("Inactive", DepositType::Percentage, dec!(10));
        p.is_active = false;
        let quote = DepositResolver::quote(&[p], &weekday_ctx(RoomCategoryId::new()));
        assert_eq!(quote, DepositQuote::none());
    }

    #[test]
    fn test_unscoped_non_default_policy_never_matches() {
        let mut p = policy("Orphan", DepositType::Percentage, dec!(10));
        p.applies_to_all_rooms = false;
        assert!(!DepositResolver::matches(&p, &weekday_ctx(RoomCategoryId::new())));
    }

    #[test]
    fn test_specificity_tiers() {
        let category = RoomCategoryId::new();
        let plan = RatePlanId::new();
        let ctx = DepositContext {
            rate_plan_id: Some(plan),
            ..weekday_ctx(category)
        };

        let default = policy("Default", DepositType::Percentage, dec!(10));
        let mut by_plan = policy("Plan", DepositType::Percentage, dec!(20));
        by_plan.rate_plan_id = Some(plan);
        let mut by_category = policy("Category", DepositType::Percentage, dec!(30));
        by_category.category_id = Some(category);
        let mut both = policy("Both", DepositType::Percentage, dec!(40));
        both.category_id = Some(category);
        both.rate_plan_id = Some(plan);

        let mut all = vec![default.clone(), by_plan.clone(), by_category.clone(), both.clone()];
        assert_eq!(DepositResolver::select(&all, &ctx).unwrap().name, "Both");
        all.retain(|p| p.id != both.id);
        assert_eq!(DepositResolver::select(&all, &ctx).unwrap().name, "Category");
        all.retain(|p| p.id != by_category.id);
        assert_eq!(DepositResolver::select(&all, &ctx).unwrap().name, "Plan");
        all.retain(|p| p.id != by_plan.id);
        assert_eq!(DepositResolver::select(&all, &ctx).unwrap().name, "Default");
    }

    #[test]
    fn test_other_category_does_not_match() {
        let mut p = policy("Suites", DepositType::Percentage, dec!(30));
        p.category_id = Some(RoomCategoryId::new());
        assert!(!DepositResolver::matches(&p, &weekday_ctx(RoomCategoryId::new())));
    }

    #[test]
    fn test_priority_then_created_at() {
        let ctx = weekday_ctx(RoomCategoryId::new());
        let mut low = policy("Low", DepositType::Percentage, dec!(10));
        let mut high = policy("High", DepositType::Percentage, dec!(20));
        high.priority = 5;
        low.priority = 1;
        assert_eq!(DepositResolver::select(&[low.clone(), high], &ctx).unwrap().name, "High");

        let mut older = policy("Older", DepositType::Percentage, dec!(10));
        older.created_at = low.created_at - Duration::days(1);
        older.priority = 1;
        assert_eq!(DepositResolver::select(&[low, older], &ctx).unwrap().name, "Older");
    }

    #[test]
    fn test_weekend_holiday_and_peak_triggers() {
        let category = RoomCategoryId::new();
        let mut p = policy("Triggers", DepositType::Percentage, dec!(10));
        p.category_id = Some(category);
        p.applies_to_all_rooms = false;
        p.requires_for_weekends = true;
        p.requires_for_holidays = true;
        p.requires_for_peak_season = true;

        let weekday = weekday_ctx(category);
        assert!(!DepositResolver::is_required(&p, &weekday));

        let weekend = DepositContext {
            dates: range((2025, 2, 7), (2025, 2, 8)),
            ..weekday_ctx(category)
        };
        assert!(DepositResolver::is_required(&p, &weekend));

        let holiday = DepositContext {
            holidays: vec![date(2025, 2, 4)],
            ..weekday_ctx(category)
        };
        assert!(DepositResolver::is_required(&p, &holiday));

        // Departure day is not an occupied night.
        let departure_holiday = DepositContext {
            holidays: vec![date(2025, 2, 6)],
            ..weekday_ctx(category)
        };
        assert!(!DepositResolver::is_required(&p, &departure_holiday));

        let peak = DepositContext {
            peak_season: true,
            ..weekday_ctx(category)
        };
        assert!(DepositResolver::is_required(&p, &peak));
        assert_eq!(DepositResolver::amount(&p, &peak), DepositResolver::amount(&p, &weekday));
    }

    fn new_policy(deposit_type: DepositType, value: Decimal) -> NewDepositPolicy {
        NewDepositPolicy {
            name: "Standard".into(),
            category_id: None,
            rate_plan_id: None,
            applies_to_all_rooms: true,
            deposit_type,
            value,
            custom_amount: None,
            min_deposit_amount: None,
            max_deposit_amount: None,
            requires_for_weekends: false,
            requires_for_holidays: false,
            requires_for_peak_season: false,
            priority: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_validate_rejects_bad_policies() {
        assert!(DepositResolver::validate(&new_policy(DepositType::Percentage, dec!(10))).is_ok());
        assert!(DepositResolver::validate(&new_policy(DepositType::Percentage, dec!(101))).is_err());
        assert!(DepositResolver::validate(&new_policy(DepositType::FixedAmount, dec!(-1))).is_err());
        assert!(DepositResolver::validate(&new_policy(DepositType::Custom, dec!(0))).is_err());

        let mut inverted = new_policy(DepositType::FixedAmount, dec!(100));
        inverted.min_deposit_amount = Some(dec!(500));
        inverted.max_deposit_amount = Some(dec!(100));
        assert!(matches!(DepositResolver::validate(&inverted), Err(DepositError::Validation(_))));

        let mut blank = new_policy(DepositType::FixedAmount, dec!(100));
        blank.name = "   ".into();
        assert!(DepositResolver::validate(&blank).is_err());
    }
}
