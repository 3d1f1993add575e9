//! Folio domain types: charges, payments, totals and the audit trail.

use chrono::{DateTime, Utc};
use innkeep_shared::types::{ChargeId, FolioId, PaymentId, StayId, TenantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Folio lifecycle status. One-way: `open → {closed, voided}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolioStatus {
    /// Accepting charges and payments.
    Open,
    /// Settled at checkout.
    Closed,
    /// Cancelled by a manager.
    Voided,
}

impl FolioStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Voided => "voided",
        }
    }
}

impl std::fmt::Display for FolioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Revenue bucket of a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeCategory {
    /// Room revenue.
    RoomRate,
    /// Restaurant and bar.
    FoodBeverage,
    /// Minibar consumption.
    Minibar,
    /// Laundry service.
    Laundry,
    /// Spa and wellness.
    Spa,
    /// Fees (late checkout, cleaning, ...).
    Fee,
    /// Anything else.
    Other,
}

/// How a payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the desk.
    Cash,
    /// Credit or debit card.
    Card,
    /// Bank transfer.
    BankTransfer,
    /// Voucher or prepaid credit.
    Voucher,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Returns the wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Voucher => "voucher",
            Self::Other => "other",
        }
    }
}

/// Payment status. Only `completed` payments count towards the folio totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Money received.
    Completed,
    /// Money returned to the guest.
    Refunded,
    /// Recorded in error.
    Voided,
}

/// A posted charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    /// Charge ID.
    pub id: ChargeId,
    /// Line description.
    pub description: String,
    /// Revenue bucket.
    pub category: ChargeCategory,
    /// Price per unit.
    pub unit_amount: Decimal,
    /// Number of units.
    pub quantity: u32,
    /// Tax percentage in `[0, 100]`.
    pub tax_rate: Decimal,
    /// `round2(unit × qty × (1 + tax/100))`.
    pub line_total: Decimal,
    /// When the charge was posted.
    pub posted_at: DateTime<Utc>,
    /// Who posted it.
    pub posted_by: UserId,
}

/// A payment against the folio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    pub id: PaymentId,
    /// Amount received.
    pub amount: Decimal,
    /// Tender type.
    pub method: PaymentMethod,
    /// Current status.
    pub status: PaymentStatus,
    /// External reference (card slip, transfer id).
    pub reference: Option<String>,
    /// When the money was received.
    pub received_at: DateTime<Utc>,
    /// Who took the payment.
    pub received_by: UserId,
    /// When the payment was refunded or voided.
    pub reversed_at: Option<DateTime<Utc>>,
    /// Why the payment was refunded or voided.
    pub reversal_reason: Option<String>,
}

impl Payment {
    /// Returns true when the payment counts towards the folio totals.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

/// Totals of a folio at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolioSnapshot {
    /// Status at the time.
    pub status: FolioStatus,
    /// Sum of charge line totals.
    pub total_charges: Decimal,
    /// Sum of completed payments.
    pub total_payments: Decimal,
    /// `total_charges - total_payments`.
    pub balance: Decimal,
}

/// One entry of the folio's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolioAuditEntry {
    /// What happened (`void`, `close_override`, `payment_refund`, ...).
    pub action: String,
    /// Who did it.
    pub actor: UserId,
    /// When.
    pub at: DateTime<Utc>,
    /// Free-text justification.
    pub reason: Option<String>,
    /// Totals before.
    pub before: FolioSnapshot,
    /// Totals after.
    pub after: FolioSnapshot,
}

/// The per-stay financial ledger. Items are embedded so that an item and the
/// totals it changes are always written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folio {
    /// Folio ID.
    pub id: FolioId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Stay the folio belongs to (one folio per stay).
    pub stay_id: StayId,
    /// Current status.
    pub status: FolioStatus,
    /// Posted charges.
    pub charges: Vec<Charge>,
    /// Payments, including reversed ones.
    pub payments: Vec<Payment>,
    /// Sum of charge line totals.
    pub total_charges: Decimal,
    /// Sum of completed payments.
    pub total_payments: Decimal,
    /// `total_charges - total_payments`. Negative means credit owed to the guest.
    pub balance: Decimal,
    /// Manager actions with before/after totals.
    pub audit_trail: Vec<FolioAuditEntry>,
    /// When the folio was opened.
    pub opened_at: DateTime<Utc>,
    /// Who opened it.
    pub opened_by: UserId,
    /// When the folio was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// When the folio was voided.
    pub voided_at: Option<DateTime<Utc>>,
    /// Why the folio was voided.
    pub void_reason: Option<String>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Folio {
    /// Creates an empty open folio for a stay.
    #[must_use]
    pub fn open(tenant_id: TenantId, stay_id: StayId, opened_by: UserId, at: DateTime<Utc>) -> Self {
        Self {
            id: FolioId::new(),
            tenant_id,
            stay_id,
            status: FolioStatus::Open,
            charges: Vec::new(),
            payments: Vec::new(),
            total_charges: Decimal::ZERO,
            total_payments: Decimal::ZERO,
            balance: Decimal::ZERO,
            audit_trail: Vec::new(),
            opened_at: at,
            opened_by,
            closed_at: None,
            voided_at: None,
            void_reason: None,
            version: 0,
        }
    }

    /// Returns true while charges and payments are accepted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == FolioStatus::Open
    }

    /// Returns true when a room-rate charge has been posted.
    #[must_use]
    pub fn has_room_rate_charge(&self) -> bool {
        self.charges
            .iter()
            .any(|c| c.category == ChargeCategory::RoomRate)
    }

    /// Finds a payment by ID.
    #[must_use]
    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    /// Current totals.
    #[must_use]
    pub const fn snapshot(&self) -> FolioSnapshot {
        FolioSnapshot {
            status: self.status,
            total_charges: self.total_charges,
            total_payments: self.total_payments,
            balance: self.balance,
        }
    }
}

/// Input for posting a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCharge {
    /// Line description.
    pub description: String,
    /// Revenue bucket.
    pub category: ChargeCategory,
    /// Price per unit.
    pub unit_amount: Decimal,
    /// Number of units (at least 1).
    pub quantity: u32,
    /// Tax percentage; `None` means untaxed.
    pub tax_rate: Option<Decimal>,
}

/// Input for recording a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    /// Amount received (positive).
    pub amount: Decimal,
    /// Tender type.
    pub method: PaymentMethod,
    /// External reference.
    pub reference: Option<String>,
}
