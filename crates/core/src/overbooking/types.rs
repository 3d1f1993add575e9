//! Overbooking settings, snapshots and alerts.

use chrono::{DateTime, NaiveDate, Utc};
use innkeep_shared::types::{OverbookingAlertId, OverbookingSettingId, RoomCategoryId, TenantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Threshold band of an overbooking percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Below the alert threshold.
    Normal,
    /// At or above the alert threshold.
    Warning,
    /// At or above the critical threshold.
    Critical,
}

/// Overbooking policy for a category, or the tenant default when
/// `category_id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverbookingSetting {
    /// Setting ID.
    pub id: OverbookingSettingId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Category scope; `None` is the tenant default.
    pub category_id: Option<RoomCategoryId>,
    /// Whether bookings beyond physical inventory are accepted.
    pub allow_overbooking: bool,
    /// Ceiling on the overbooked percentage.
    pub max_overbooking_percent: Decimal,
    /// Warning band start.
    pub alert_threshold_percent: Decimal,
    /// Critical band start.
    pub critical_threshold_percent: Decimal,
    /// Who last changed it.
    pub updated_by: Option<UserId>,
    /// When it last changed.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a setting.
#[derive(Debug, Clone)]
pub struct SettingInput {
    /// Category scope; `None` is the tenant default.
    pub category_id: Option<RoomCategoryId>,
    /// Whether overbooking is accepted.
    pub allow_overbooking: bool,
    /// Ceiling percent.
    pub max_overbooking_percent: Decimal,
    /// Warning band start.
    pub alert_threshold_percent: Decimal,
    /// Critical band start.
    pub critical_threshold_percent: Decimal,
}

/// Booked-vs-capacity numbers of one category on one night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverbookingSnapshot {
    /// Category.
    pub category_id: RoomCategoryId,
    /// Night.
    pub date: NaiveDate,
    /// Rooms in the category.
    pub total_rooms: u32,
    /// Active stays occupying the night.
    pub booked: u32,
    /// `max(0, booked - total)`.
    pub overbooking_count: u32,
    /// `count / total × 100`, 2 dp.
    pub overbooking_percent: Decimal,
    /// Threshold band.
    pub severity: Severity,
}

/// Alert lifecycle. `resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Needs attention.
    Open,
    /// Handled.
    Resolved,
}

/// Overbooking alert, unique per (tenant, category, date) while open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverbookingAlert {
    /// Alert ID.
    pub id: OverbookingAlertId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Category.
    pub category_id: RoomCategoryId,
    /// Night.
    pub date: NaiveDate,
    /// Rooms in the category at the last breach.
    pub total_rooms: u32,
    /// Stays booked at the last breach.
    pub booked: u32,
    /// Overbooked rooms at the last breach.
    pub overbooking_count: u32,
    /// Overbooked percent at the last breach.
    pub overbooking_percent: Decimal,
    /// Band at the last breach.
    pub severity: Severity,
    /// Lifecycle status.
    pub status: AlertStatus,
    /// First breach.
    pub raised_at: DateTime<Utc>,
    /// Last breach.
    pub updated_at: DateTime<Utc>,
    /// Resolution time.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Who resolved it.
    pub resolved_by: Option<UserId>,
    /// What was done about it.
    pub resolution_notes: Option<String>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl OverbookingAlert {
    /// Returns true while unresolved.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == AlertStatus::Open
    }
}
