//! In-memory document store.
//!
//! Every tenant owns one partition behind its own async mutex, so writes of
//! different tenants never contend and a write inside a partition sees a
//! consistent snapshot of all its documents. Consistency scope: one process.
//! Conditional writes (versions, room guards, audit claims) are checked and
//! applied under the partition lock, which makes each of them atomic.

mod audits;
mod deposits;
mod folios;
mod overbooking;
mod rooms;
mod stays;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use innkeep_core::Repositories;
use innkeep_core::deposit::{DepositPayment, DepositPolicy};
use innkeep_core::booking::Stay;
use innkeep_core::folio::Folio;
use innkeep_core::night_audit::{NightAuditRecord, SmartAlert};
use innkeep_core::overbooking::{OverbookingAlert, OverbookingSetting};
use innkeep_core::room::{Room, RoomBlock, RoomCategory};
use innkeep_core::shift::Shift;
use innkeep_shared::types::{
    DepositPaymentId, FolioId, OverbookingAlertId, RoomCategoryId, RoomId, ShiftId, StayId, TenantId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// State of one (tenant, date) night audit slot.
#[derive(Debug, Clone)]
enum AuditSlot {
    /// A run holds the slot.
    Claimed(Uuid),
    /// The record is final.
    Completed(Box<NightAuditRecord>),
}

#[derive(Debug, Default)]
struct Partition {
    rooms: HashMap<RoomId, Room>,
    categories: HashMap<RoomCategoryId, RoomCategory>,
    blocks: Vec<RoomBlock>,
    stays: HashMap<StayId, Stay>,
    room_versions: HashMap<RoomId, u64>,
    folios: HashMap<FolioId, Folio>,
    deposit_policies: Vec<DepositPolicy>,
    deposit_payments: HashMap<DepositPaymentId, DepositPayment>,
    overbooking_settings: Vec<OverbookingSetting>,
    overbooking_alerts: HashMap<OverbookingAlertId, OverbookingAlert>,
    audits: BTreeMap<NaiveDate, AuditSlot>,
    shifts: HashMap<ShiftId, Shift>,
    smart_alerts: Vec<SmartAlert>,
}

/// Tenant-partitioned document store implementing every storage port.
#[derive(Debug, Default)]
pub struct DocumentStore {
    partitions: DashMap<TenantId, Arc<Mutex<Partition>>>,
}

impl DocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every port backed by this store.
    #[must_use]
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            rooms: self.clone(),
            stays: self.clone(),
            folios: self.clone(),
            deposits: self.clone(),
            overbooking: self.clone(),
            audits: self.clone(),
            shifts: self.clone(),
            smart_alerts: self.clone(),
        }
    }

    /// Number of tenants with at least one document.
    #[must_use]
    pub fn tenant_count(&self) -> usize {
        self.partitions.len()
    }

    async fn partition(&self, tenant_id: TenantId) -> OwnedPartition {
        // Clone the Arc out so no map shard lock is held across the await.
        let cell = self.partitions.entry(tenant_id).or_default().clone();
        OwnedPartition(cell.lock_owned().await)
    }
}

/// Exclusive access to one tenant's partition.
struct OwnedPartition(OwnedMutexGuard<Partition>);

impl std::ops::Deref for OwnedPartition {
    type Target = Partition;

    fn deref(&self) -> &Partition {
        &self.0
    }
}

impl std::ops::DerefMut for OwnedPartition {
    fn deref_mut(&mut self) -> &mut Partition {
        &mut self.0
    }
}
