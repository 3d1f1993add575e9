//! Shared fixtures for the document-store integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use innkeep_core::booking::{CreateStayInput, GuestInfo, Stay};
use innkeep_core::deposit::{DepositType, NewDepositPolicy};
use innkeep_core::events::{EventEnvelope, EventPublisher};
use innkeep_core::extension::ExtensionMap;
use innkeep_core::overbooking::SettingInput;
use innkeep_core::room::{Room, RoomCategory, RoomStatus};
use innkeep_core::{Actor, Clock, CoreSettings, FixedClock, Services};
use innkeep_db::DocumentStore;
use innkeep_shared::Role;
use innkeep_shared::types::{RoomCategoryId, RoomId, TenantId, UserId};
use rust_decimal::Decimal;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// One tenant with a single category of rooms numbered 101, 102, ...
pub struct Harness {
    pub store: Arc<DocumentStore>,
    pub services: Services,
    pub clock: Arc<FixedClock>,
    pub events: UnboundedReceiver<EventEnvelope>,
    pub tenant: TenantId,
    pub category: RoomCategoryId,
    pub rooms: Vec<Room>,
    pub front_desk: Actor,
    pub manager: Actor,
    pub auditor: Actor,
}

impl Harness {
    pub async fn new(room_count: usize) -> Self {
        let store = Arc::new(DocumentStore::new());
        Self::on_store(store, TenantId::new(), room_count).await
    }

    pub async fn on_store(store: Arc<DocumentStore>, tenant: TenantId, room_count: usize) -> Self {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()));
        let (events, rx) = EventPublisher::channel();
        let services = Services::new(
            store.repositories(),
            events,
            clock.clone() as Arc<dyn Clock>,
            CoreSettings::default(),
        );

        let category = RoomCategory {
            id: RoomCategoryId::new(),
            tenant_id: tenant,
            name: "Deluxe King".into(),
            base_capacity: 2,
            description: None,
        };
        let repos = &services.repos;
        repos.rooms.upsert_category(category.clone()).await.expect("category");

        let mut rooms = Vec::with_capacity(room_count);
        for i in 0..room_count {
            let room = Room {
                id: RoomId::new(),
                tenant_id: tenant,
                number: format!("{}", 101 + i),
                category_id: category.id,
                capacity: 2,
                status: RoomStatus::Clean,
                extensions: ExtensionMap::new(),
                updated_at: clock.now(),
            };
            rooms.push(repos.rooms.upsert_room(room).await.expect("room"));
        }

        Self {
            store,
            services,
            clock,
            events: rx,
            tenant,
            category: category.id,
            rooms,
            front_desk: Actor::new(UserId::new(), Role::FrontDesk),
            manager: Actor::new(UserId::new(), Role::Manager),
            auditor: Actor::new(UserId::new(), Role::NightAuditor),
        }
    }

    pub fn room(&self, index: usize) -> RoomId {
        self.rooms[index].id
    }

    pub fn stay_input(&self, room_id: RoomId, check_in: NaiveDate, check_out: NaiveDate, rate: Decimal) -> CreateStayInput {
        CreateStayInput {
            room_id,
            guest: GuestInfo {
                name: "Grace Hopper".into(),
                email: Some("grace@example.com".into()),
                phone: None,
                adults: 1,
                children: 0,
            },
            check_in,
            check_out,
            total_rate: rate,
            rate_plan_id: None,
            holidays: Vec::new(),
            peak_season: false,
            extensions: ExtensionMap::new(),
        }
    }

    pub async fn book(&self, room: usize, check_in: NaiveDate, check_out: NaiveDate, rate: Decimal) -> Stay {
        self.services
            .bookings
            .create(self.tenant, &self.front_desk, self.stay_input(self.room(room), check_in, check_out, rate))
            .await
            .expect("booking should succeed")
    }

    pub async fn allow_overbooking(&self, max_percent: Decimal) {
        self.services
            .overbooking
            .upsert_setting(
                self.tenant,
                &self.manager,
                SettingInput {
                    category_id: Some(self.category),
                    allow_overbooking: true,
                    max_overbooking_percent: max_percent,
                    alert_threshold_percent: Decimal::from(5),
                    critical_threshold_percent: Decimal::from(8),
                },
            )
            .await
            .expect("overbooking setting");
    }

    /// The tenant-wide 10% policy that applies to every room.
    pub async fn default_deposit_policy(&self) {
        self.services
            .deposits
            .create_policy(
                self.tenant,
                &self.manager,
                NewDepositPolicy {
                    name: "Standard 10%".into(),
                    category_id: None,
                    rate_plan_id: None,
                    applies_to_all_rooms: true,
                    deposit_type: DepositType::Percentage,
                    value: Decimal::from(10),
                    custom_amount: None,
                    min_deposit_amount: None,
                    max_deposit_amount: None,
                    requires_for_weekends: false,
                    requires_for_holidays: false,
                    requires_for_peak_season: false,
                    priority: 0,
                    is_active: true,
                },
            )
            .await
            .expect("deposit policy");
    }

    /// Drains the queued events and returns their names.
    pub fn event_names(&mut self) -> Vec<&'static str> {
        let mut names = Vec::new();
        while let Ok(envelope) = self.events.try_recv() {
            names.push(envelope.event.name());
        }
        names
    }
}
