//! Night audit records, discrepancies and smart alerts.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use innkeep_shared::types::{NightAuditId, RoomId, SmartAlertId, TenantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::folio::PaymentMethod;

/// Outcome of a completed audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// No discrepancies.
    Completed,
    /// At least one discrepancy was found.
    CompletedWithWarnings,
}

impl AuditStatus {
    /// Status for a run that found `discrepancies` problems.
    #[must_use]
    pub const fn for_discrepancies(discrepancies: usize) -> Self {
        if discrepancies == 0 {
            Self::Completed
        } else {
            Self::CompletedWithWarnings
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Completed => "completed",
            Self::CompletedWithWarnings => "completed_with_warnings",
        })
    }
}

/// What an audit discrepancy is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// A cashier shift was never closed.
    OpenShift,
    /// A closed folio carries a balance.
    ClosedFolioBalance,
    /// A folio with a balance is still open after its guest left.
    OpenFolioAfterDeparture,
    /// Charges posted and payments received on the day do not match.
    DailyImbalance,
}

impl DiscrepancyKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenShift => "open_shift",
            Self::ClosedFolioBalance => "closed_folio_balance",
            Self::OpenFolioAfterDeparture => "open_folio_after_departure",
            Self::DailyImbalance => "daily_imbalance",
        }
    }
}

/// One problem found by the audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Kind of problem.
    pub kind: DiscrepancyKind,
    /// Affected entity (shift or folio ID), if any.
    pub entity_id: Option<String>,
    /// Amount involved, if any.
    pub amount: Option<Decimal>,
    /// Human-readable description.
    pub message: String,
}

/// Operating figures for the audited day.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Rooms in inventory.
    pub total_rooms: u32,
    /// Rooms occupied on the audited night.
    pub occupied_rooms: u32,
    /// `occupied_rooms / total_rooms`, 4 dp.
    pub occupancy_rate: Decimal,
    /// Guests checked in during the day.
    pub check_ins: u32,
    /// Guests checked out during the day.
    pub check_outs: u32,
    /// Stays marked no-show during the day.
    pub no_shows: u32,
    /// Stays cancelled during the day.
    pub cancellations: u32,
    /// Completed payments received during the day.
    pub revenue: Decimal,
    /// Revenue split by payment method.
    pub revenue_by_method: BTreeMap<PaymentMethod, Decimal>,
    /// Charges posted during the day.
    pub charges_posted: Decimal,
    /// Average daily rate.
    pub adr: Decimal,
    /// Revenue per available room.
    pub revpar: Decimal,
}

/// The immutable result of one night audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightAuditRecord {
    /// Record ID.
    pub id: NightAuditId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Audited business date (UTC).
    pub audit_date: NaiveDate,
    /// Run that claimed the date.
    pub run_id: Uuid,
    /// Outcome.
    pub status: AuditStatus,
    /// Operating figures.
    pub summary: AuditSummary,
    /// Problems found.
    pub discrepancies: Vec<Discrepancy>,
    /// Rooms sent to housekeeping.
    pub rooms_marked_dirty: Vec<RoomId>,
    /// User who ran the audit.
    pub run_by: UserId,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the record was written.
    pub completed_at: DateTime<Utc>,
}

/// An operational alert raised from an audit discrepancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartAlert {
    /// Alert ID.
    pub id: SmartAlertId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Audit that raised it.
    pub audit_id: NightAuditId,
    /// Audited date.
    pub audit_date: NaiveDate,
    /// Kind of problem.
    pub kind: DiscrepancyKind,
    /// Affected entity, if any.
    pub entity_id: Option<String>,
    /// Amount involved, if any.
    pub amount: Option<Decimal>,
    /// Description.
    pub message: String,
    /// When it was raised.
    pub raised_at: DateTime<Utc>,
}

impl SmartAlert {
    /// Builds the alert for one discrepancy of `record`.
    #[must_use]
    pub fn from_discrepancy(record: &NightAuditRecord, discrepancy: &Discrepancy) -> Self {
        Self {
            id: SmartAlertId::new(),
            tenant_id: record.tenant_id,
            audit_id: record.id,
            audit_date: record.audit_date,
            kind: discrepancy.kind,
            entity_id: discrepancy.entity_id.clone(),
            amount: discrepancy.amount,
            message: discrepancy.message.clone(),
            raised_at: record.completed_at,
        }
    }
}
