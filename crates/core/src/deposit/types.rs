//! Deposit policy and deposit payment types.

use chrono::{DateTime, NaiveDate, Utc};
use innkeep_shared::types::{
    DepositPaymentId, DepositPolicyId, RatePlanId, RoomCategoryId, StayId, TenantId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::folio::PaymentMethod;

/// How a policy computes its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositType {
    /// `value` percent of the total stay rate.
    Percentage,
    /// `value` as a flat amount.
    FixedAmount,
    /// `value` nights at the average nightly rate.
    Nights,
    /// The policy's `custom_amount`.
    Custom,
}

/// Specificity tier of a policy, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    /// Category and rate plan both set.
    CategoryAndRatePlan,
    /// Category only.
    Category,
    /// Rate plan only.
    RatePlan,
    /// Neither set, applies to all rooms.
    Default,
}

/// A tenant's deposit rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPolicy {
    /// Policy ID.
    pub id: DepositPolicyId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Unique name within the tenant.
    pub name: String,
    /// Restrict to a room category.
    pub category_id: Option<RoomCategoryId>,
    /// Restrict to a rate plan.
    pub rate_plan_id: Option<RatePlanId>,
    /// Makes an unscoped policy the tenant default and the deposit mandatory.
    pub applies_to_all_rooms: bool,
    /// Calculation method.
    pub deposit_type: DepositType,
    /// Percentage, amount or number of nights depending on the type.
    pub value: Decimal,
    /// Amount for `custom` policies.
    pub custom_amount: Option<Decimal>,
    /// Lower clamp.
    pub min_deposit_amount: Option<Decimal>,
    /// Upper clamp.
    pub max_deposit_amount: Option<Decimal>,
    /// Mandatory when any night is a Friday or Saturday.
    pub requires_for_weekends: bool,
    /// Mandatory when any night is a holiday.
    pub requires_for_holidays: bool,
    /// Mandatory in peak season.
    pub requires_for_peak_season: bool,
    /// Higher wins within a tier.
    pub priority: i32,
    /// Inactive policies never match.
    pub is_active: bool,
    /// Who created it.
    pub created_by: UserId,
    /// Creation time; earliest wins ties.
    pub created_at: DateTime<Utc>,
}

impl DepositPolicy {
    /// The policy's specificity tier, or `None` when it can never match.
    #[must_use]
    pub const fn scope(&self) -> Option<PolicyScope> {
        match (self.category_id.is_some(), self.rate_plan_id.is_some()) {
            (true, true) => Some(PolicyScope::CategoryAndRatePlan),
            (true, false) => Some(PolicyScope::Category),
            (false, true) => Some(PolicyScope::RatePlan),
            (false, false) if self.applies_to_all_rooms => Some(PolicyScope::Default),
            (false, false) => None,
        }
    }
}

/// Input for creating a policy.
#[derive(Debug, Clone)]
pub struct NewDepositPolicy {
    /// Unique name.
    pub name: String,
    /// Category restriction.
    pub category_id: Option<RoomCategoryId>,
    /// Rate plan restriction.
    pub rate_plan_id: Option<RatePlanId>,
    /// Default/mandatory flag.
    pub applies_to_all_rooms: bool,
    /// Calculation method.
    pub deposit_type: DepositType,
    /// Method parameter.
    pub value: Decimal,
    /// Amount for `custom` policies.
    pub custom_amount: Option<Decimal>,
    /// Lower clamp.
    pub min_deposit_amount: Option<Decimal>,
    /// Upper clamp.
    pub max_deposit_amount: Option<Decimal>,
    /// Weekend trigger.
    pub requires_for_weekends: bool,
    /// Holiday trigger.
    pub requires_for_holidays: bool,
    /// Peak-season trigger.
    pub requires_for_peak_season: bool,
    /// Tie-break priority.
    pub priority: i32,
    /// Whether the policy is live.
    pub is_active: bool,
}

/// Everything the resolver needs to know about a stay.
#[derive(Debug, Clone)]
pub struct DepositContext {
    /// Room category.
    pub category_id: RoomCategoryId,
    /// Rate plan.
    pub rate_plan_id: Option<RatePlanId>,
    /// Booked nights.
    pub dates: DateRange,
    /// Total stay rate.
    pub total_rate: Decimal,
    /// Tenant holidays.
    pub holidays: Vec<NaiveDate>,
    /// Caller-supplied peak-season flag.
    pub peak_season: bool,
}

/// Resolved deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositQuote {
    /// Amount, clamped and rounded.
    pub amount: Decimal,
    /// Whether the deposit is mandatory.
    pub required: bool,
    /// Matched policy.
    pub policy_id: Option<DepositPolicyId>,
    /// Matched policy name.
    pub policy_name: Option<String>,
}

impl DepositQuote {
    /// The quote when no policy matches.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            amount: Decimal::ZERO,
            required: false,
            policy_id: None,
            policy_name: None,
        }
    }
}

/// Deposit payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPaymentStatus {
    /// Held in full.
    Received,
    /// Part returned.
    PartiallyRefunded,
    /// Fully returned.
    Refunded,
}

/// Money taken against a stay before arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPayment {
    /// Payment ID.
    pub id: DepositPaymentId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Stay.
    pub stay_id: StayId,
    /// Amount received.
    pub amount: Decimal,
    /// Tender type.
    pub method: PaymentMethod,
    /// Current status.
    pub status: DepositPaymentStatus,
    /// External reference.
    pub reference: Option<String>,
    /// When the money arrived.
    pub received_at: DateTime<Utc>,
    /// Who took it.
    pub received_by: UserId,
    /// Total refunded so far.
    pub refunded_amount: Decimal,
    /// Reason for the last refund.
    pub refund_reason: Option<String>,
    /// Time of the last refund.
    pub refunded_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl DepositPayment {
    /// Amount still held.
    #[must_use]
    pub fn held(&self) -> Decimal {
        self.amount - self.refunded_amount
    }
}

/// Deposit position of a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSummary {
    /// Stay.
    pub stay_id: StayId,
    /// Deposit quoted at booking.
    pub quoted: Decimal,
    /// Whether it is mandatory.
    pub required: bool,
    /// Sum of amounts still held.
    pub paid: Decimal,
    /// `max(0, quoted - paid)`.
    pub outstanding: Decimal,
}
