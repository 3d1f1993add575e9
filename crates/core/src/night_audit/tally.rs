//! Pure night audit calculations over a snapshot of the tenant's data.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use innkeep_shared::types::{RoomId, StayId, is_settled, round_money};
use rust_decimal::{Decimal, RoundingStrategy};

use super::types::{AuditSummary, Discrepancy, DiscrepancyKind};
use crate::booking::{Stay, StayStatus};
use crate::folio::{Folio, FolioStatus, PaymentMethod};
use crate::room::{Room, RoomStatus, RoomStatusChange};
use crate::shift::Shift;

/// Half-open UTC window `[00:00, next 00:00)` of `date`.
#[must_use]
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

fn within(at: Option<DateTime<Utc>>, window: (DateTime<Utc>, DateTime<Utc>)) -> bool {
    at.is_some_and(|t| t >= window.0 && t < window.1)
}

/// Distinct rooms with a guest in house on night `date`.
#[must_use]
pub fn occupied_rooms(stays: &[Stay], date: NaiveDate) -> u32 {
    let rooms: BTreeSet<RoomId> = stays
        .iter()
        .filter(|s| matches!(s.status, StayStatus::CheckedIn | StayStatus::CheckedOut))
        .filter(|s| s.dates.contains_night(date))
        .map(|s| s.room_id)
        .collect();
    u32::try_from(rooms.len()).unwrap_or(u32::MAX)
}

/// `occupied / total` as a fraction with 4 decimal places; 0 without rooms.
#[must_use]
pub fn occupancy_rate(occupied: u32, total: u32) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(occupied) / Decimal::from(total))
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Completed payments received during `date`, in total and per method.
#[must_use]
pub fn revenue(folios: &[Folio], date: NaiveDate) -> (Decimal, BTreeMap<PaymentMethod, Decimal>) {
    let window = day_window(date);
    let mut by_method: BTreeMap<PaymentMethod, Decimal> = BTreeMap::new();
    for payment in folios
        .iter()
        .flat_map(|f| &f.payments)
        .filter(|p| p.is_completed() && within(Some(p.received_at), window))
    {
        *by_method.entry(payment.method).or_default() += payment.amount;
    }
    (by_method.values().copied().sum(), by_method)
}

/// Line totals of charges posted during `date`.
#[must_use]
pub fn charges_posted(folios: &[Folio], date: NaiveDate) -> Decimal {
    let window = day_window(date);
    folios
        .iter()
        .flat_map(|f| &f.charges)
        .filter(|c| within(Some(c.posted_at), window))
        .map(|c| c.line_total)
        .sum()
}

/// Builds the day's operating figures.
#[must_use]
pub fn summarize(rooms: &[Room], stays: &[Stay], folios: &[Folio], date: NaiveDate) -> AuditSummary {
    let window = day_window(date);
    let count = |pick: fn(&Stay) -> Option<DateTime<Utc>>| {
        let n = stays.iter().filter(|s| within(pick(s), window)).count();
        u32::try_from(n).unwrap_or(u32::MAX)
    };

    let total_rooms = u32::try_from(rooms.len()).unwrap_or(u32::MAX);
    let occupied = occupied_rooms(stays, date);
    let occupancy = occupancy_rate(occupied, total_rooms);
    let (revenue, revenue_by_method) = revenue(folios, date);
    let adr = if occupied == 0 {
        Decimal::ZERO
    } else {
        round_money(revenue / Decimal::from(occupied))
    };

    AuditSummary {
        total_rooms,
        occupied_rooms: occupied,
        occupancy_rate: occupancy,
        check_ins: count(|s| s.checked_in_at),
        check_outs: count(|s| s.checked_out_at),
        no_shows: count(|s| s.no_show_at),
        cancellations: count(|s| s.cancelled_at),
        revenue,
        revenue_by_method,
        charges_posted: charges_posted(folios, date),
        adr,
        revpar: round_money(adr * occupancy),
    }
}

/// Finds open shifts, unsettled folios and a charge/payment mismatch.
///
/// A folio closed with a balance is reported on the day it was closed. An
/// open folio after departure is reported once: folios listed in
/// `already_reported` were flagged by an earlier record and are skipped.
#[must_use]
pub fn find_discrepancies(
    shifts: &[Shift],
    folios: &[Folio],
    stays: &HashMap<StayId, Stay>,
    already_reported: &BTreeSet<String>,
    summary: &AuditSummary,
    date: NaiveDate,
    epsilon: Decimal,
) -> Vec<Discrepancy> {
    let window = day_window(date);
    let mut found: Vec<Discrepancy> = shifts
        .iter()
        .map(|shift| Discrepancy {
            kind: DiscrepancyKind::OpenShift,
            entity_id: Some(shift.id.to_string()),
            amount: None,
            message: format!("Shift {} opened at {} is still open", shift.id, shift.opened_at),
        })
        .collect();

    for folio in folios.iter().filter(|f| !is_settled(f.balance, epsilon)) {
        let folio_id = folio.id.to_string();
        match folio.status {
            FolioStatus::Closed if within(folio.closed_at, window) => found.push(Discrepancy {
                kind: DiscrepancyKind::ClosedFolioBalance,
                entity_id: Some(folio_id),
                amount: Some(folio.balance),
                message: format!("Folio {} was closed with balance {}", folio.id, folio.balance),
            }),
            FolioStatus::Open if !already_reported.contains(&folio_id) => {
                let departed = stays.get(&folio.stay_id).is_some_and(|stay| {
                    stay.status == StayStatus::CheckedOut || stay.dates.end() < date
                });
                if departed {
                    found.push(Discrepancy {
                        kind: DiscrepancyKind::OpenFolioAfterDeparture,
                        entity_id: Some(folio_id),
                        amount: Some(folio.balance),
                        message: format!(
                            "Folio {} is still open with balance {} after departure",
                            folio.id, folio.balance
                        ),
                    });
                }
            }
            FolioStatus::Closed | FolioStatus::Open | FolioStatus::Voided => {}
        }
    }

    let gap = summary.charges_posted - summary.revenue;
    if gap.abs() > epsilon {
        found.push(Discrepancy {
            kind: DiscrepancyKind::DailyImbalance,
            entity_id: None,
            amount: Some(gap),
            message: format!(
                "Charges posted ({}) and payments received ({}) differ by {gap}",
                summary.charges_posted, summary.revenue
            ),
        });
    }
    found
}

/// Rooms vacated during `date` that still need to go to housekeeping.
#[must_use]
pub fn rooms_to_mark_dirty(rooms: &[Room], stays: &[Stay], date: NaiveDate) -> Vec<RoomStatusChange> {
    let window = day_window(date);
    let departed: BTreeSet<RoomId> = stays
        .iter()
        .filter(|s| s.status == StayStatus::CheckedOut && within(s.checked_out_at, window))
        .map(|s| s.room_id)
        .collect();
    rooms
        .iter()
        .filter(|r| departed.contains(&r.id) && !r.status.keeps_status_on_departure())
        .map(|r| RoomStatusChange {
            room_id: r.id,
            status: RoomStatus::Dirty,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folio::{ChargeCategory, FolioLedger, NewCharge, NewPayment};
    use crate::testing::{date, range, stay};
    use chrono::TimeZone;
    use innkeep_shared::types::{TenantId, UserId};
    use rust_decimal_macros::dec;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, d, h, 0, 0).unwrap()
    }

    fn folio_with(charge: Decimal, paid: Decimal, posted: DateTime<Utc>) -> Folio {
        let user = UserId::new();
        let mut folio = Folio::open(TenantId::new(), StayId::new(), user, posted);
        FolioLedger::post_charge(
            &mut folio,
            NewCharge {
                description: "Room rate".into(),
                category: ChargeCategory::RoomRate,
                unit_amount: charge,
                quantity: 1,
                tax_rate: None,
            },
            user,
            posted,
        )
        .unwrap();
        if paid > Decimal::ZERO {
            FolioLedger::post_payment(
                &mut folio,
                NewPayment {
                    amount: paid,
                    method: PaymentMethod::Card,
                    reference: None,
                },
                user,
                posted,
            )
            .unwrap();
        }
        folio
    }

    #[test]
    fn test_day_window_is_utc_midnight_to_midnight() {
        let (start, end) = day_window(date(2025, 2, 10));
        assert_eq!(start, at(10, 0));
        assert_eq!(end, at(11, 0));
    }

    #[test]
    fn test_occupancy_counts_in_house_rooms_only() {
        let mut in_house = stay(range((2025, 2, 9), (2025, 2, 12)));
        in_house.status = StayStatus::CheckedIn;
        let expected = stay(range((2025, 2, 10), (2025, 2, 11)));
        assert_eq!(occupied_rooms(&[in_house, expected], date(2025, 2, 10)), 1);
        assert_eq!(occupancy_rate(1, 3), dec!(0.3333));
        assert_eq!(occupancy_rate(0, 0), Decimal::ZERO);
    }

    #[test]
    fn test_revenue_ignores_other_days() {
        let today = folio_with(dec!(100), dec!(100), at(10, 9));
        let yesterday = folio_with(dec!(50), dec!(50), at(9, 9));
        let (total, by_method) = revenue(&[today, yesterday], date(2025, 2, 10));
        assert_eq!(total, dec!(100));
        assert_eq!(by_method.get(&PaymentMethod::Card), Some(&dec!(100)));
    }

    #[test]
    fn test_summary_derives_adr_and_revpar() {
        let mut a = stay(range((2025, 2, 10), (2025, 2, 11)));
        a.status = StayStatus::CheckedIn;
        a.checked_in_at = Some(at(10, 15));
        let rooms: Vec<Room> = Vec::new();
        let folio = folio_with(dec!(300), dec!(300), at(10, 15));
        let summary = summarize(&rooms, &[a], &[folio], date(2025, 2, 10));
        assert_eq!(summary.check_ins, 1);
        assert_eq!(summary.occupied_rooms, 1);
        assert_eq!(summary.adr, dec!(300));
        // No inventory means zero occupancy and zero RevPAR.
        assert_eq!(summary.revpar, Decimal::ZERO);
    }

    #[test]
    fn test_flags_open_shift_closed_balance_and_imbalance() {
        let shift = Shift::open(TenantId::new(), UserId::new(), dec!(200), at(10, 6));
        let mut closed = folio_with(dec!(100), dec!(40), at(10, 9));
        closed.status = FolioStatus::Closed;
        closed.closed_at = Some(at(10, 20));
        let summary = AuditSummary {
            charges_posted: dec!(100),
            revenue: dec!(40),
            ..AuditSummary::default()
        };
        let found = find_discrepancies(
            &[shift],
            &[closed],
            &HashMap::new(),
            &BTreeSet::new(),
            &summary,
            date(2025, 2, 10),
            dec!(0.01),
        );
        let kinds: Vec<_> = found.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiscrepancyKind::OpenShift,
                DiscrepancyKind::ClosedFolioBalance,
                DiscrepancyKind::DailyImbalance
            ]
        );
    }

    #[test]
    fn test_open_folio_flagged_only_after_departure() {
        let mut guest = stay(range((2025, 2, 8), (2025, 2, 12)));
        guest.status = StayStatus::CheckedIn;
        let mut folio = folio_with(dec!(100), Decimal::ZERO, at(10, 9));
        folio.stay_id = guest.id;
        let summary = AuditSummary::default();
        let mut stays = HashMap::from([(guest.id, guest.clone())]);

        let none = BTreeSet::new();

        let found = find_discrepancies(&[], &[folio.clone()], &stays, &none, &summary, date(2025, 2, 10), dec!(0.01));
        assert!(found.is_empty());

        guest.status = StayStatus::CheckedOut;
        stays.insert(guest.id, guest);
        let found = find_discrepancies(&[], &[folio.clone()], &stays, &none, &summary, date(2025, 2, 10), dec!(0.01));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DiscrepancyKind::OpenFolioAfterDeparture);
        assert_eq!(found[0].amount, Some(dec!(100)));

        let reported = BTreeSet::from([folio.id.to_string()]);
        let found = find_discrepancies(&[], &[folio], &stays, &reported, &summary, date(2025, 2, 11), dec!(0.01));
        assert!(found.is_empty());
    }

    #[test]
    fn test_closed_folio_balance_reported_on_its_closing_day_only() {
        let mut closed = folio_with(dec!(100), dec!(40), at(10, 9));
        closed.status = FolioStatus::Closed;
        closed.closed_at = Some(at(10, 20));
        let summary = AuditSummary::default();
        let none = BTreeSet::new();

        let on_the_day = find_discrepancies(&[], &[closed.clone()], &HashMap::new(), &none, &summary, date(2025, 2, 10), dec!(0.01));
        assert_eq!(on_the_day.len(), 1);
        assert_eq!(on_the_day[0].kind, DiscrepancyKind::ClosedFolioBalance);

        let next_day = find_discrepancies(&[], &[closed], &HashMap::new(), &none, &summary, date(2025, 2, 11), dec!(0.01));
        assert!(next_day.is_empty());
    }
}
