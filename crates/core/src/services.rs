//! Wiring of the core services over one set of repositories.

use std::sync::Arc;

use crate::availability::AvailabilityIndex;
use crate::booking::BookingOrchestrator;
use crate::clock::Clock;
use crate::deposit::DepositService;
use crate::events::EventPublisher;
use crate::folio::FolioService;
use crate::night_audit::{AuditStores, NightAuditEngine};
use crate::overbooking::OverbookingMonitor;
use crate::repository::{
    DepositRepository, FolioRepository, NightAuditRepository, OverbookingRepository, RoomRepository,
    ShiftRepository, SmartAlertRepository, StayRepository,
};
use crate::settings::CoreSettings;

/// One implementation of every storage port.
#[derive(Clone)]
pub struct Repositories {
    /// Rooms, categories and blocks.
    pub rooms: Arc<dyn RoomRepository>,
    /// Stays.
    pub stays: Arc<dyn StayRepository>,
    /// Folios.
    pub folios: Arc<dyn FolioRepository>,
    /// Deposit policies and payments.
    pub deposits: Arc<dyn DepositRepository>,
    /// Overbooking settings and alerts.
    pub overbooking: Arc<dyn OverbookingRepository>,
    /// Night audit records.
    pub audits: Arc<dyn NightAuditRepository>,
    /// Cashier shifts.
    pub shifts: Arc<dyn ShiftRepository>,
    /// Smart alerts.
    pub smart_alerts: Arc<dyn SmartAlertRepository>,
}

/// The full set of core services.
#[derive(Clone)]
pub struct Services {
    /// Availability queries.
    pub availability: Arc<AvailabilityIndex>,
    /// Stay lifecycle.
    pub bookings: Arc<BookingOrchestrator>,
    /// Deposit policies and payments.
    pub deposits: Arc<DepositService>,
    /// Overbooking settings, status and alerts.
    pub overbooking: Arc<OverbookingMonitor>,
    /// Folio ledger.
    pub folios: Arc<FolioService>,
    /// Night audit.
    pub night_audit: Arc<NightAuditEngine>,
    /// Repositories the services were built over.
    pub repos: Repositories,
}

impl Services {
    /// Builds every service over `repos`.
    pub fn new(repos: Repositories, events: EventPublisher, clock: Arc<dyn Clock>, settings: CoreSettings) -> Self {
        let folios = Arc::new(FolioService::new(
            repos.folios.clone(),
            repos.stays.clone(),
            events.clone(),
            clock.clone(),
            settings,
        ));
        let deposits = Arc::new(DepositService::new(
            repos.deposits.clone(),
            repos.stays.clone(),
            events.clone(),
            clock.clone(),
            settings,
        ));
        let overbooking = Arc::new(OverbookingMonitor::new(
            repos.rooms.clone(),
            repos.stays.clone(),
            repos.overbooking.clone(),
            events.clone(),
            clock.clone(),
            settings,
        ));
        let bookings = Arc::new(BookingOrchestrator::new(
            repos.rooms.clone(),
            repos.stays.clone(),
            folios.clone(),
            deposits.clone(),
            overbooking.clone(),
            events.clone(),
            clock.clone(),
            settings,
        ));
        let night_audit = Arc::new(NightAuditEngine::new(
            AuditStores {
                rooms: repos.rooms.clone(),
                stays: repos.stays.clone(),
                folios: repos.folios.clone(),
                audits: repos.audits.clone(),
                shifts: repos.shifts.clone(),
                alerts: repos.smart_alerts.clone(),
            },
            events,
            clock,
            settings,
        ));

        Self {
            availability: Arc::new(AvailabilityIndex::new(repos.rooms.clone(), repos.stays.clone())),
            bookings,
            deposits,
            overbooking,
            folios,
            night_audit,
            repos,
        }
    }
}
