//! Pure overbooking arithmetic.

use chrono::NaiveDate;
use innkeep_shared::types::{OverbookingSettingId, RoomCategoryId, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::OverbookingError;
use super::types::{OverbookingSetting, OverbookingSnapshot, SettingInput, Severity};
use crate::settings::ThresholdDefaults;

/// The thresholds in force for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePolicy {
    /// Whether overbooking is accepted.
    pub allow_overbooking: bool,
    /// Ceiling percent.
    pub max_overbooking_percent: Decimal,
    /// Warning band start.
    pub alert_threshold_percent: Decimal,
    /// Critical band start.
    pub critical_threshold_percent: Decimal,
    /// Setting the policy came from; `None` for built-in defaults.
    pub source: Option<OverbookingSettingId>,
}

impl EffectivePolicy {
    /// Built-in defaults: overbooking disallowed.
    #[must_use]
    pub const fn from_defaults(defaults: ThresholdDefaults) -> Self {
        Self {
            allow_overbooking: false,
            max_overbooking_percent: defaults.max_overbooking_percent,
            alert_threshold_percent: defaults.alert_threshold_percent,
            critical_threshold_percent: defaults.critical_threshold_percent,
            source: None,
        }
    }

    fn from_setting(setting: &OverbookingSetting) -> Self {
        Self {
            allow_overbooking: setting.allow_overbooking,
            max_overbooking_percent: setting.max_overbooking_percent,
            alert_threshold_percent: setting.alert_threshold_percent,
            critical_threshold_percent: setting.critical_threshold_percent,
            source: Some(setting.id),
        }
    }
}

/// Stateless overbooking calculator.
pub struct OverbookingCalculator;

impl OverbookingCalculator {
    /// Category setting, else tenant default setting, else built-in defaults.
    #[must_use]
    pub fn effective_policy(
        settings: &[OverbookingSetting],
        category_id: RoomCategoryId,
        defaults: ThresholdDefaults,
    ) -> EffectivePolicy {
        settings
            .iter()
            .find(|s| s.category_id == Some(category_id))
            .or_else(|| settings.iter().find(|s| s.category_id.is_none()))
            .map_or_else(|| EffectivePolicy::from_defaults(defaults), EffectivePolicy::from_setting)
    }

    /// `max(0, booked - total)`.
    #[must_use]
    pub const fn overbooking_count(total_rooms: u32, booked: u32) -> u32 {
        booked.saturating_sub(total_rooms)
    }

    /// `count / total × 100` rounded to 2 dp. With no rooms: 100 if anything
    /// is booked, else 0.
    #[must_use]
    pub fn overbooking_percent(total_rooms: u32, booked: u32) -> Decimal {
        if total_rooms == 0 {
            return if booked > 0 { Decimal::ONE_HUNDRED } else { Decimal::ZERO };
        }
        let count = Decimal::from(Self::overbooking_count(total_rooms, booked));
        round_money(count * Decimal::ONE_HUNDRED / Decimal::from(total_rooms))
    }

    /// Threshold band. Nothing overbooked is always `normal`.
    #[must_use]
    pub fn severity(overbooking_count: u32, percent: Decimal, policy: &EffectivePolicy) -> Severity {
        if overbooking_count == 0 {
            Severity::Normal
        } else if percent >= policy.critical_threshold_percent {
            Severity::Critical
        } else if percent >= policy.alert_threshold_percent {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }

    /// Full snapshot of one category-night.
    #[must_use]
    pub fn snapshot(
        category_id: RoomCategoryId,
        date: NaiveDate,
        total_rooms: u32,
        booked: u32,
        policy: &EffectivePolicy,
    ) -> OverbookingSnapshot {
        let overbooking_count = Self::overbooking_count(total_rooms, booked);
        let overbooking_percent = Self::overbooking_percent(total_rooms, booked);
        OverbookingSnapshot {
            category_id,
            date,
            total_rooms,
            booked,
            overbooking_count,
            overbooking_percent,
            severity: Self::severity(overbooking_count, overbooking_percent, policy),
        }
    }

    /// Returns true when `booked_after` stays fit under the ceiling:
    /// `booked_after × 100 <= total × (100 + max)`.
    #[must_use]
    pub fn within_limit(total_rooms: u32, booked_after: u32, max_percent: Decimal) -> bool {
        Decimal::from(booked_after) * Decimal::ONE_HUNDRED
            <= Decimal::from(total_rooms) * (Decimal::ONE_HUNDRED + max_percent)
    }

    /// Validates a setting: `0 <= alert <= critical`, non-negative ceiling.
    pub fn validate(input: &SettingInput) -> Result<(), OverbookingError> {
        if input.alert_threshold_percent < Decimal::ZERO {
            return Err(OverbookingError::InvalidSetting(
                "alert_threshold_percent must not be negative".into(),
            ));
        }
        if input.alert_threshold_percent > input.critical_threshold_percent {
            return Err(OverbookingError::InvalidSetting(format!(
                "alert threshold {} exceeds critical threshold {}",
                input.alert_threshold_percent, input.critical_threshold_percent
            )));
        }
        if input.max_overbooking_percent < Decimal::ZERO {
            return Err(OverbookingError::InvalidSetting(
                "max_overbooking_percent must not be negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::date;
    use chrono::Utc;
    use innkeep_shared::types::TenantId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn policy(alert: Decimal, critical: Decimal) -> EffectivePolicy {
        EffectivePolicy {
            allow_overbooking: true,
            max_overbooking_percent: dec!(10),
            alert_threshold_percent: alert,
            critical_threshold_percent: critical,
            source: None,
        }
    }

    #[test]
    fn test_twenty_rooms_twenty_two_booked_is_critical() {
        let snap = OverbookingCalculator::snapshot(
            RoomCategoryId::new(),
            date(2025, 2, 10),
            20,
            22,
            &policy(dec!(5), dec!(8)),
        );
        assert_eq!(snap.overbooking_count, 2);
        assert_eq!(snap.overbooking_percent, dec!(10.00));
        assert_eq!(snap.severity, Severity::Critical);
    }

    #[rstest]
    #[case(20, 20, dec!(0), Severity::Normal)]
    #[case(20, 18, dec!(0), Severity::Normal)]
    #[case(100, 106, dec!(6.00), Severity::Warning)]
    #[case(100, 104, dec!(4.00), Severity::Normal)]
    #[case(3, 4, dec!(33.33), Severity::Critical)]
    #[case(0, 0, dec!(0), Severity::Normal)]
    #[case(0, 2, dec!(100), Severity::Critical)]
    fn test_percent_and_band(
        #[case] total: u32,
        #[case] booked: u32,
        #[case] percent: Decimal,
        #[case] severity: Severity,
    ) {
        let snap = OverbookingCalculator::snapshot(
            RoomCategoryId::new(),
            date(2025, 2, 10),
            total,
            booked,
            &policy(dec!(5), dec!(8)),
        );
        assert_eq!(snap.overbooking_percent, percent);
        assert_eq!(snap.severity, severity);
    }

    #[rstest]
    #[case(20, 22, dec!(10), true)]
    #[case(20, 23, dec!(10), false)]
    #[case(10, 10, dec!(0), true)]
    #[case(10, 11, dec!(0), false)]
    #[case(0, 1, dec!(50), false)]
    fn test_within_limit(#[case] total: u32, #[case] after: u32, #[case] max: Decimal, #[case] ok: bool) {
        assert_eq!(OverbookingCalculator::within_limit(total, after, max), ok);
    }

    #[test]
    fn test_category_setting_beats_tenant_default() {
        let tenant = TenantId::new();
        let category = RoomCategoryId::new();
        let setting = |category_id, allow| OverbookingSetting {
            id: OverbookingSettingId::new(),
            tenant_id: tenant,
            category_id,
            allow_overbooking: allow,
            max_overbooking_percent: dec!(10),
            alert_threshold_percent: dec!(5),
            critical_threshold_percent: dec!(8),
            updated_by: None,
            updated_at: Utc::now(),
        };
        let defaults = ThresholdDefaults::default();

        let none = OverbookingCalculator::effective_policy(&[], category, defaults);
        assert!(!none.allow_overbooking);
        assert_eq!(none.source, None);

        let tenant_wide = setting(None, true);
        let effective = OverbookingCalculator::effective_policy(std::slice::from_ref(&tenant_wide), category, defaults);
        assert!(effective.allow_overbooking);

        let specific = setting(Some(category), false);
        let effective = OverbookingCalculator::effective_policy(&[tenant_wide, specific.clone()], category, defaults);
        assert!(!effective.allow_overbooking);
        assert_eq!(effective.source, Some(specific.id));
    }

    #[test]
    fn test_validate_thresholds() {
        let input = |alert, critical| SettingInput {
            category_id: None,
            allow_overbooking: true,
            max_overbooking_percent: dec!(10),
            alert_threshold_percent: alert,
            critical_threshold_percent: critical,
        };
        assert!(OverbookingCalculator::validate(&input(dec!(5), dec!(8))).is_ok());
        assert!(OverbookingCalculator::validate(&input(dec!(5), dec!(5))).is_ok());
        assert!(OverbookingCalculator::validate(&input(dec!(9), dec!(8))).is_err());
        assert!(OverbookingCalculator::validate(&input(dec!(-1), dec!(8))).is_err());
    }
}
