//! Stay (reservation) domain types and the stay status machine.

use chrono::{DateTime, NaiveDate, Utc};
use innkeep_shared::types::{
    DepositPolicyId, FolioId, RatePlanId, RoomCategoryId, RoomId, StayId, TenantId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::extension::ExtensionMap;
use crate::folio::{NewCharge, NewPayment};

/// Stay lifecycle status.
///
/// `confirmed → checked_in → checked_out`, with side exits
/// `confirmed → cancelled` and `confirmed → no_show`. No reverse transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StayStatus {
    /// Booked, guest not yet arrived.
    Confirmed,
    /// Guest in house.
    CheckedIn,
    /// Guest departed.
    CheckedOut,
    /// Cancelled before arrival.
    Cancelled,
    /// Guest never arrived.
    NoShow,
}

impl StayStatus {
    /// Returns true when the stay holds its room for its date range.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Confirmed | Self::CheckedIn)
    }

    /// Returns true when no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CheckedOut | Self::Cancelled | Self::NoShow)
    }

    /// Returns true when `self → next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Confirmed, Self::CheckedIn | Self::Cancelled | Self::NoShow)
                | (Self::CheckedIn, Self::CheckedOut)
        )
    }

    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Statuses that hold inventory.
    pub const ACTIVE: [Self; 2] = [Self::Confirmed, Self::CheckedIn];
}

impl std::fmt::Display for StayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StayStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "checked_in" => Ok(Self::CheckedIn),
            "checked_out" => Ok(Self::CheckedOut),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            _ => Err(format!("Unknown stay status: {s}")),
        }
    }
}

/// Guest contact details carried on a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInfo {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Number of adults.
    pub adults: u32,
    /// Number of children.
    pub children: u32,
}

impl GuestInfo {
    /// Total head count.
    #[must_use]
    pub const fn party_size(&self) -> u32 {
        self.adults + self.children
    }
}

/// A guest's booked occupancy of a room for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    /// Stay ID.
    pub id: StayId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Assigned room.
    pub room_id: RoomId,
    /// Category of the assigned room (denormalized for overbooking counts).
    pub category_id: RoomCategoryId,
    /// Guest details.
    pub guest: GuestInfo,
    /// Booked nights.
    pub dates: DateRange,
    /// Current status.
    pub status: StayStatus,
    /// Total room revenue for the whole stay.
    pub total_rate: Decimal,
    /// Rate plan the stay was sold under.
    pub rate_plan_id: Option<RatePlanId>,
    /// Deposit quoted at booking time.
    pub deposit_amount: Decimal,
    /// Whether the quoted deposit is mandatory.
    pub deposit_required: bool,
    /// Policy that produced the deposit quote.
    pub deposit_policy_id: Option<DepositPolicyId>,
    /// Folio opened at check-in.
    pub folio_id: Option<FolioId>,
    /// Tenant-defined fields.
    pub extensions: ExtensionMap,
    /// Who booked the stay.
    pub created_by: UserId,
    /// Creation time; earliest-created wins ties on overbooked room-days.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Actual arrival.
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Actual departure.
    pub checked_out_at: Option<DateTime<Utc>>,
    /// Cancellation time.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Cancellation reason.
    pub cancellation_reason: Option<String>,
    /// When the stay was marked as a no-show.
    pub no_show_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Stay {
    /// Number of nights booked.
    #[must_use]
    pub fn nights(&self) -> u32 {
        self.dates.nights()
    }

    /// Average nightly rate (total rate spread over the nights).
    #[must_use]
    pub fn nightly_rate(&self) -> Decimal {
        let nights = self.nights();
        if nights == 0 {
            return self.total_rate;
        }
        self.total_rate / Decimal::from(nights)
    }

    /// Returns true when the stay holds its room.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Input for booking a stay.
#[derive(Debug, Clone)]
pub struct CreateStayInput {
    /// Room to book.
    pub room_id: RoomId,
    /// Guest details.
    pub guest: GuestInfo,
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date.
    pub check_out: NaiveDate,
    /// Total room revenue for the stay.
    pub total_rate: Decimal,
    /// Rate plan.
    pub rate_plan_id: Option<RatePlanId>,
    /// Tenant holidays used by deposit triggers.
    pub holidays: Vec<NaiveDate>,
    /// Whether the dates fall in the tenant's peak season.
    pub peak_season: bool,
    /// Tenant-defined fields.
    pub extensions: ExtensionMap,
}

/// Input for moving a stay to another room and/or dates.
#[derive(Debug, Clone)]
pub struct MoveStayInput {
    /// Target room (may equal the current room).
    pub room_id: RoomId,
    /// New arrival date.
    pub check_in: NaiveDate,
    /// New departure date.
    pub check_out: NaiveDate,
}

/// Input for checking a guest out.
#[derive(Debug, Clone, Default)]
pub struct CheckOutInput {
    /// Charges to post before closing the folio.
    pub final_charges: Vec<NewCharge>,
    /// Settlement payment.
    pub payment: Option<NewPayment>,
    /// Close the folio even if the balance is not settled (elevated roles only).
    pub manager_override: bool,
}

/// Coarse stay listing filter.
#[derive(Debug, Clone, Default)]
pub struct StayFilter {
    /// Only stays in these statuses (all when empty).
    pub statuses: Vec<StayStatus>,
    /// Only stays in this room.
    pub room_id: Option<RoomId>,
    /// Only stays sharing at least one night with this window.
    pub overlapping: Option<DateRange>,
}
