//! Tunables the core services read, derived from [`AppConfig`].

use innkeep_shared::AppConfig;
use innkeep_shared::types::BALANCE_EPSILON;
use rust_decimal::Decimal;

/// Thresholds applied to categories without an overbooking setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdDefaults {
    /// Warning band starts here (percent).
    pub alert_threshold_percent: Decimal,
    /// Critical band starts here (percent).
    pub critical_threshold_percent: Decimal,
    /// Ceiling once a setting enables overbooking (percent).
    pub max_overbooking_percent: Decimal,
}

impl Default for ThresholdDefaults {
    fn default() -> Self {
        Self {
            alert_threshold_percent: Decimal::from(5),
            critical_threshold_percent: Decimal::from(8),
            max_overbooking_percent: Decimal::from(10),
        }
    }
}

/// Settings shared by the core services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSettings {
    /// Retries after an optimistic-concurrency conflict.
    pub max_commit_retries: u32,
    /// A balance with absolute value below this is settled.
    pub balance_epsilon: Decimal,
    /// Overbooking defaults.
    pub overbooking: ThresholdDefaults,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            max_commit_retries: 3,
            balance_epsilon: BALANCE_EPSILON,
            overbooking: ThresholdDefaults::default(),
        }
    }
}

impl From<&AppConfig> for CoreSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_commit_retries: config.booking.max_commit_retries,
            balance_epsilon: config.audit.balance_epsilon(),
            overbooking: ThresholdDefaults {
                alert_threshold_percent: Decimal::from(config.overbooking.alert_threshold),
                critical_threshold_percent: Decimal::from(config.overbooking.critical_threshold),
                max_overbooking_percent: Decimal::from(config.overbooking.max_overbooking_percent),
            },
        }
    }
}
