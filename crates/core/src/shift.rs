//! Front-desk cash shifts. The night audit flags shifts left open.

use chrono::{DateTime, Utc};
use innkeep_shared::types::{ShiftId, TenantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shift status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// Cash drawer in use.
    Open,
    /// Drawer counted and handed over.
    Closed,
}

/// A cashier's shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Shift ID.
    pub id: ShiftId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Cashier.
    pub user_id: UserId,
    /// Current status.
    pub status: ShiftStatus,
    /// Cash in the drawer at opening.
    pub opening_float: Decimal,
    /// Counted cash at closing.
    pub closing_cash: Option<Decimal>,
    /// When the shift started.
    pub opened_at: DateTime<Utc>,
    /// When the shift was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Shift {
    /// Opens a new shift.
    #[must_use]
    pub fn open(tenant_id: TenantId, user_id: UserId, opening_float: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            id: ShiftId::new(),
            tenant_id,
            user_id,
            status: ShiftStatus::Open,
            opening_float,
            closing_cash: None,
            opened_at: at,
            closed_at: None,
        }
    }

    /// Closes the shift with the counted cash.
    pub fn close(&mut self, counted: Decimal, at: DateTime<Utc>) {
        self.status = ShiftStatus::Closed;
        self.closing_cash = Some(counted);
        self.closed_at = Some(at);
    }
}
