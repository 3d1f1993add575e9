//! Stay lifecycle against the document store.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use common::{Harness, date};
use innkeep_core::availability::{AvailabilityTarget, DayStatus};
use innkeep_core::booking::{BookingError, CheckOutInput, MoveStayInput, Stay, StayFilter, StayStatus};
use innkeep_core::calendar::DateRange;
use innkeep_core::events::EventPublisher;
use innkeep_core::folio::{ChargeCategory, FolioStatus, NewCharge, NewPayment, PaymentMethod};
use innkeep_core::overbooking::OverbookingError;
use innkeep_core::repository::{RepoResult, RoomStays, StayQuery, StayRepository, StayWrite};
use innkeep_core::room::{RoomBlock, RoomStatus, RoomStatusChange};
use innkeep_core::{Clock, CoreSettings, Services};
use innkeep_db::DocumentStore;
use innkeep_shared::AppError;
use innkeep_shared::types::{RoomBlockId, RoomId, StayId, TenantId};
use rust_decimal_macros::dec;

// ============================================================================
// Booking
// ============================================================================

#[tokio::test]
async fn test_scenario_a_books_with_default_deposit() {
    let mut h = Harness::new(1).await;
    h.default_deposit_policy().await;

    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 4), dec!(50000)).await;

    assert_eq!(stay.status, StayStatus::Confirmed);
    assert_eq!(stay.nights(), 3);
    assert_eq!(stay.deposit_amount, dec!(5000.00));
    assert!(stay.deposit_required);
    assert_eq!(stay.version, 1);
    assert_eq!(h.event_names(), vec!["booking_confirmed"]);
}

#[tokio::test]
async fn test_scenario_b_rejects_overlap_without_overbooking() {
    let h = Harness::new(1).await;
    h.book(0, date(2025, 2, 1), date(2025, 2, 4), dec!(50000)).await;

    let err = h
        .services
        .bookings
        .create(
            h.tenant,
            &h.front_desk,
            h.stay_input(h.room(0), date(2025, 2, 2), date(2025, 2, 3), dec!(10000)),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BookingError::Overbooking(OverbookingError::OverbookingNotAllowed { .. })
    ));
    assert!(matches!(AppError::from(err), AppError::Conflict(_)));
}

#[tokio::test]
async fn test_back_to_back_stays_share_no_night() {
    let h = Harness::new(1).await;
    h.book(0, date(2025, 2, 1), date(2025, 2, 4), dec!(300)).await;
    let next = h.book(0, date(2025, 2, 4), date(2025, 2, 6), dec!(200)).await;
    assert_eq!(next.dates.start(), date(2025, 2, 4));
}

#[tokio::test]
async fn test_rejects_inverted_and_empty_ranges() {
    let h = Harness::new(1).await;
    for (from, to) in [(date(2025, 2, 4), date(2025, 2, 1)), (date(2025, 2, 4), date(2025, 2, 4))] {
        let err = h
            .services
            .bookings
            .create(h.tenant, &h.front_desk, h.stay_input(h.room(0), from, to, dec!(100)))
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }
}

#[tokio::test]
async fn test_blocked_and_out_of_order_rooms_reject_bookings() {
    let h = Harness::new(2).await;
    let block = RoomBlock {
        id: RoomBlockId::new(),
        tenant_id: h.tenant,
        room_id: h.room(0),
        dates: DateRange::new(date(2025, 2, 2), date(2025, 2, 3)).unwrap(),
        reason: "Carpet replacement".into(),
        created_at: Utc::now(),
    };
    h.services.repos.rooms.insert_block(block).await.unwrap();
    h.services
        .repos
        .rooms
        .set_room_statuses(
            h.tenant,
            &[RoomStatusChange {
                room_id: h.room(1),
                status: RoomStatus::OutOfOrder,
            }],
            h.clock.now(),
        )
        .await
        .unwrap();

    for room in [0, 1] {
        let err = h
            .services
            .bookings
            .create(
                h.tenant,
                &h.front_desk,
                h.stay_input(h.room(room), date(2025, 2, 1), date(2025, 2, 4), dec!(100)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::RoomBlocked { .. }), "room {room}: {err}");
    }
}

#[tokio::test]
async fn test_cancelled_stay_frees_its_nights() {
    let h = Harness::new(1).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 4), dec!(300)).await;

    let err = h.services.bookings.cancel(h.tenant, stay.id, "  ").await.unwrap_err();
    assert_eq!(err.http_status_code(), 400);

    let cancelled = h
        .services
        .bookings
        .cancel(h.tenant, stay.id, "Guest request")
        .await
        .unwrap();
    assert_eq!(cancelled.status, StayStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Guest request"));

    h.book(0, date(2025, 2, 2), date(2025, 2, 3), dec!(100)).await;
}

#[tokio::test]
async fn test_no_show_only_from_confirmed() {
    let h = Harness::new(1).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 4), dec!(300)).await;
    h.services.bookings.mark_no_show(h.tenant, stay.id).await.unwrap();

    let err = h.services.bookings.mark_no_show(h.tenant, stay.id).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition { .. }));
    assert_eq!(err.http_status_code(), 409);
}

// ============================================================================
// Moves
// ============================================================================

#[tokio::test]
async fn test_move_checks_the_target_room_and_ignores_itself() {
    let h = Harness::new(2).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 4), dec!(300)).await;
    h.book(1, date(2025, 2, 3), date(2025, 2, 5), dec!(200)).await;

    // Extending in place overlaps only the stay itself.
    let extended = h
        .services
        .bookings
        .move_stay(
            h.tenant,
            stay.id,
            MoveStayInput {
                room_id: h.room(0),
                check_in: date(2025, 2, 1),
                check_out: date(2025, 2, 6),
            },
        )
        .await
        .unwrap();
    assert_eq!(extended.dates.nights(), 5);
    assert_eq!(extended.version, 2);

    let err = h
        .services
        .bookings
        .move_stay(
            h.tenant,
            stay.id,
            MoveStayInput {
                room_id: h.room(1),
                check_in: date(2025, 2, 1),
                check_out: date(2025, 2, 4),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status_code(), 409);
}

#[tokio::test]
async fn test_checked_in_stay_keeps_its_arrival_date() {
    let h = Harness::new(2).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 4), dec!(300)).await;
    h.clock.set(Utc.with_ymd_and_hms(2025, 2, 1, 15, 0, 0).unwrap());
    h.services.bookings.check_in(h.tenant, &h.front_desk, stay.id).await.unwrap();

    let err = h
        .services
        .bookings
        .move_stay(
            h.tenant,
            stay.id,
            MoveStayInput {
                room_id: h.room(0),
                check_in: date(2025, 2, 2),
                check_out: date(2025, 2, 4),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::CheckInDateLocked(_)));

    let moved = h
        .services
        .bookings
        .move_stay(
            h.tenant,
            stay.id,
            MoveStayInput {
                room_id: h.room(1),
                check_in: date(2025, 2, 1),
                check_out: date(2025, 2, 5),
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.room_id, h.room(1));

    let old = h.services.repos.rooms.get_room(h.tenant, h.room(0)).await.unwrap().unwrap();
    let new = h.services.repos.rooms.get_room(h.tenant, h.room(1)).await.unwrap().unwrap();
    assert_eq!(old.status, RoomStatus::Dirty);
    assert_eq!(new.status, RoomStatus::Occupied);
}

// ============================================================================
// Check-in / check-out
// ============================================================================

#[tokio::test]
async fn test_scenario_c_full_stay_settles_and_closes() {
    let mut h = Harness::new(1).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 4), dec!(50000)).await;

    h.clock.set(Utc.with_ymd_and_hms(2025, 2, 1, 15, 0, 0).unwrap());
    let checked_in = h.services.bookings.check_in(h.tenant, &h.front_desk, stay.id).await.unwrap();
    let folio_id = checked_in.folio_id.expect("folio attached at check-in");
    let folio = h.services.folios.get(h.tenant, folio_id).await.unwrap();
    assert_eq!(folio.total_charges, dec!(50000));
    let room = h.services.repos.rooms.get_room(h.tenant, h.room(0)).await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Occupied);

    h.clock.set(Utc.with_ymd_and_hms(2025, 2, 4, 11, 0, 0).unwrap());
    let checked_out = h
        .services
        .bookings
        .check_out(
            h.tenant,
            &h.front_desk,
            stay.id,
            CheckOutInput {
                final_charges: vec![NewCharge {
                    description: "Minibar".into(),
                    category: ChargeCategory::Minibar,
                    unit_amount: dec!(1500),
                    quantity: 2,
                    tax_rate: Some(dec!(5)),
                }],
                payment: Some(NewPayment {
                    amount: dec!(53150),
                    method: PaymentMethod::Card,
                    reference: None,
                }),
                manager_override: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(checked_out.status, StayStatus::CheckedOut);

    let folio = h.services.folios.get(h.tenant, folio_id).await.unwrap();
    assert_eq!(folio.total_charges, dec!(53150.00));
    assert_eq!(folio.balance, dec!(0));
    assert_eq!(folio.status, FolioStatus::Closed);

    let room = h.services.repos.rooms.get_room(h.tenant, h.room(0)).await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Dirty);
    assert_eq!(
        h.event_names(),
        vec!["booking_confirmed", "stay_checked_in", "folio_closed", "stay_checked_out"]
    );
}

#[tokio::test]
async fn test_unsettled_checkout_changes_nothing() {
    let h = Harness::new(1).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 2), dec!(100)).await;
    let stay = h.services.bookings.check_in(h.tenant, &h.front_desk, stay.id).await.unwrap();
    let folio_id = stay.folio_id.unwrap();
    let before = h.services.folios.get(h.tenant, folio_id).await.unwrap();

    let input = CheckOutInput {
        final_charges: vec![NewCharge {
            description: "Laundry".into(),
            category: ChargeCategory::Laundry,
            unit_amount: dec!(20),
            quantity: 1,
            tax_rate: None,
        }],
        payment: Some(NewPayment {
            amount: dec!(100),
            method: PaymentMethod::Cash,
            reference: None,
        }),
        manager_override: false,
    };
    let err = h
        .services
        .bookings
        .check_out(h.tenant, &h.front_desk, stay.id, input.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::BalanceNotSettled { balance } if balance == dec!(20)));
    assert_eq!(h.services.folios.get(h.tenant, folio_id).await.unwrap(), before);

    // Front desk cannot override; a manager can.
    let err = h
        .services
        .bookings
        .check_out(h.tenant, &h.front_desk, stay.id, CheckOutInput { manager_override: true, ..input.clone() })
        .await
        .unwrap_err();
    assert_eq!(err.http_status_code(), 403);

    h.services
        .bookings
        .check_out(h.tenant, &h.manager, stay.id, CheckOutInput { manager_override: true, ..input })
        .await
        .unwrap();
    let folio = h.services.folios.get(h.tenant, folio_id).await.unwrap();
    assert_eq!(folio.status, FolioStatus::Closed);
    assert_eq!(folio.balance, dec!(20));
    assert!(folio.audit_trail.iter().any(|e| e.action == "close_override"));
}

#[tokio::test]
async fn test_repeated_check_in_is_rejected_and_rate_posted_once() {
    let h = Harness::new(1).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 3), dec!(400)).await;
    h.services.bookings.check_in(h.tenant, &h.front_desk, stay.id).await.unwrap();
    let err = h.services.bookings.check_in(h.tenant, &h.front_desk, stay.id).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition { .. }));

    let folio = h.services.folios.find_by_stay(h.tenant, stay.id).await.unwrap().unwrap();
    assert_eq!(folio.charges.len(), 1);
    assert_eq!(folio.balance, dec!(400));
}

/// Cancels the stay just before its check-in write reaches the store.
struct CancelBeforeCheckIn {
    inner: Arc<DocumentStore>,
    fired: AtomicBool,
}

#[async_trait]
impl StayRepository for CancelBeforeCheckIn {
    async fn get(&self, tenant_id: TenantId, stay_id: StayId) -> RepoResult<Option<Stay>> {
        StayRepository::get(self.inner.as_ref(), tenant_id, stay_id).await
    }

    async fn list_for_room(&self, tenant_id: TenantId, room_id: RoomId) -> RepoResult<RoomStays> {
        StayRepository::list_for_room(self.inner.as_ref(), tenant_id, room_id).await
    }

    async fn list(&self, tenant_id: TenantId, query: &StayQuery) -> RepoResult<Vec<Stay>> {
        StayRepository::list(self.inner.as_ref(), tenant_id, query).await
    }

    async fn commit(&self, write: StayWrite) -> RepoResult<Stay> {
        if write.stay.status == StayStatus::CheckedIn && !self.fired.swap(true, Ordering::SeqCst) {
            let mut current = StayRepository::get(self.inner.as_ref(), write.stay.tenant_id, write.stay.id)
                .await?
                .expect("stay exists");
            let version = current.version;
            current.status = StayStatus::Cancelled;
            current.cancellation_reason = Some("guest called".into());
            StayRepository::commit(
                self.inner.as_ref(),
                StayWrite {
                    stay: current,
                    expected_version: Some(version),
                    room_guards: Vec::new(),
                },
            )
            .await?;
        }
        StayRepository::commit(self.inner.as_ref(), write).await
    }
}

#[tokio::test]
async fn test_check_in_racing_a_cancel_leaves_no_folio() {
    let h = Harness::new(1).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 3), dec!(200)).await;

    let mut repos = h.store.repositories();
    repos.stays = Arc::new(CancelBeforeCheckIn {
        inner: Arc::clone(&h.store),
        fired: AtomicBool::new(false),
    });
    let racing = Services::new(
        repos,
        EventPublisher::disabled(),
        h.clock.clone() as Arc<dyn Clock>,
        CoreSettings::default(),
    );

    let err = racing.bookings.check_in(h.tenant, &h.front_desk, stay.id).await.unwrap_err();
    assert!(matches!(
        err,
        BookingError::InvalidTransition {
            status: StayStatus::Cancelled,
            ..
        }
    ));

    let stored = h.services.bookings.get(h.tenant, stay.id).await.unwrap();
    assert_eq!(stored.status, StayStatus::Cancelled);
    assert_eq!(stored.folio_id, None);
    assert!(h.services.folios.find_by_stay(h.tenant, stay.id).await.unwrap().is_none());
    let room = h.services.repos.rooms.get_room(h.tenant, h.room(0)).await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Clean);
}

#[tokio::test]
async fn test_check_out_posts_the_rate_when_check_in_left_no_folio() {
    let h = Harness::new(1).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 3), dec!(400)).await;

    // A checked-in stay whose folio steps never ran.
    let mut checked_in = stay.clone();
    checked_in.status = StayStatus::CheckedIn;
    StayRepository::commit(
        h.store.as_ref(),
        StayWrite {
            stay: checked_in,
            expected_version: Some(stay.version),
            room_guards: Vec::new(),
        },
    )
    .await
    .unwrap();

    let err = h
        .services
        .bookings
        .check_out(h.tenant, &h.front_desk, stay.id, CheckOutInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::BalanceNotSettled { balance } if balance == dec!(400)));

    let input = CheckOutInput {
        payment: Some(NewPayment {
            amount: dec!(400),
            method: PaymentMethod::Cash,
            reference: None,
        }),
        ..CheckOutInput::default()
    };
    let out = h.services.bookings.check_out(h.tenant, &h.front_desk, stay.id, input).await.unwrap();
    assert_eq!(out.status, StayStatus::CheckedOut);

    let folio = h.services.folios.find_by_stay(h.tenant, stay.id).await.unwrap().unwrap();
    assert_eq!(folio.status, FolioStatus::Closed);
    assert_eq!(folio.charges.len(), 1);
    assert_eq!(folio.total_charges, dec!(400));
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_availability_reflects_bookings() {
    let h = Harness::new(1).await;
    let stay = h.book(0, date(2025, 2, 2), date(2025, 2, 3), dec!(100)).await;

    let report = h
        .services
        .availability
        .query(h.tenant, AvailabilityTarget::Room(h.room(0)), date(2025, 2, 1), date(2025, 2, 4))
        .await
        .unwrap();
    let days = &report.rooms[0].days;
    assert_eq!(days.len(), 3);
    let statuses: Vec<DayStatus> = days.iter().map(|d| d.status).collect();
    assert_eq!(statuses, vec![DayStatus::Available, DayStatus::CheckIn, DayStatus::CheckOut]);
    assert_eq!(days[1].primary_stay, Some(stay.id));
    assert!(days[2].stay_ids.is_empty());
}

#[tokio::test]
async fn test_list_filters_by_status_and_window() {
    let h = Harness::new(2).await;
    let a = h.book(0, date(2025, 2, 1), date(2025, 2, 3), dec!(100)).await;
    let b = h.book(1, date(2025, 2, 10), date(2025, 2, 12), dec!(100)).await;
    h.services.bookings.cancel(h.tenant, b.id, "duplicate").await.unwrap();

    let confirmed = h
        .services
        .bookings
        .list(
            h.tenant,
            &StayFilter {
                statuses: vec![StayStatus::Confirmed],
                ..StayFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(confirmed.iter().map(|s| s.id).collect::<Vec<_>>(), vec![a.id]);

    let window = h
        .services
        .bookings
        .list(
            h.tenant,
            &StayFilter {
                overlapping: Some(DateRange::new(date(2025, 2, 11), date(2025, 2, 12)).unwrap()),
                ..StayFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(window.iter().map(|s| s.id).collect::<Vec<_>>(), vec![b.id]);
}

#[tokio::test]
async fn test_other_tenants_see_not_found() {
    let h = Harness::new(1).await;
    let stay = h.book(0, date(2025, 2, 1), date(2025, 2, 3), dec!(100)).await;
    let other = Harness::on_store(h.store.clone(), innkeep_shared::types::TenantId::new(), 1).await;

    let err = other.services.bookings.get(other.tenant, stay.id).await.unwrap_err();
    assert!(matches!(AppError::from(err), AppError::NotFound(_)));

    let err = other
        .services
        .bookings
        .create(
            other.tenant,
            &other.front_desk,
            other.stay_input(h.room(0), date(2025, 3, 1), date(2025, 3, 2), dec!(1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::RoomNotFound(_)));
}
