//! Fixtures shared by unit tests.

use chrono::{NaiveDate, TimeZone, Utc};
use innkeep_shared::types::{RoomCategoryId, RoomId, StayId, TenantId, UserId};
use rust_decimal::Decimal;

use crate::booking::{GuestInfo, Stay, StayStatus};
use crate::calendar::DateRange;
use crate::extension::ExtensionMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
    DateRange::new(date(start.0, start.1, start.2), date(end.0, end.1, end.2)).unwrap()
}

/// A confirmed stay in a fresh room, created at noon on 2025-01-01.
pub fn stay(dates: DateRange) -> Stay {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    Stay {
        id: StayId::new(),
        tenant_id: TenantId::new(),
        room_id: RoomId::new(),
        category_id: RoomCategoryId::new(),
        guest: GuestInfo {
            name: "Ada Guest".into(),
            email: None,
            phone: None,
            adults: 2,
            children: 0,
        },
        dates,
        status: StayStatus::Confirmed,
        total_rate: Decimal::new(50_000, 0),
        rate_plan_id: None,
        deposit_amount: Decimal::ZERO,
        deposit_required: false,
        deposit_policy_id: None,
        folio_id: None,
        extensions: ExtensionMap::new(),
        created_by: UserId::new(),
        created_at: at,
        updated_at: at,
        checked_in_at: None,
        checked_out_at: None,
        cancelled_at: None,
        cancellation_reason: None,
        no_show_at: None,
        version: 1,
    }
}
