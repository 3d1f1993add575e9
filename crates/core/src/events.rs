//! Domain events and their fire-and-forget dispatch.
//!
//! Services publish only after their write committed. Publishing never
//! blocks and never fails the caller; a background dispatcher hands each
//! event to every registered [`EventSink`] and logs sink failures.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use innkeep_shared::types::{
    DepositPaymentId, FolioId, NightAuditId, OverbookingAlertId, RoomCategoryId, RoomId, StayId,
    TenantId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::calendar::DateRange;
use crate::night_audit::AuditStatus;
use crate::overbooking::Severity;

/// Something that happened in the booking/ledger core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A stay was booked.
    BookingConfirmed {
        /// Stay.
        stay_id: StayId,
        /// Room.
        room_id: RoomId,
        /// Booked nights.
        dates: DateRange,
        /// Total rate.
        total_rate: Decimal,
        /// Deposit quoted.
        deposit_amount: Decimal,
    },
    /// A stay changed room and/or dates.
    StayMoved {
        /// Stay.
        stay_id: StayId,
        /// Previous room.
        from_room: RoomId,
        /// New room.
        to_room: RoomId,
        /// Previous nights.
        from_dates: DateRange,
        /// New nights.
        to_dates: DateRange,
    },
    /// Guest arrived.
    StayCheckedIn {
        /// Stay.
        stay_id: StayId,
        /// Room.
        room_id: RoomId,
        /// Folio opened or reused.
        folio_id: FolioId,
    },
    /// Guest departed.
    StayCheckedOut {
        /// Stay.
        stay_id: StayId,
        /// Room.
        room_id: RoomId,
        /// Closed folio.
        folio_id: FolioId,
    },
    /// Stay cancelled.
    StayCancelled {
        /// Stay.
        stay_id: StayId,
        /// Reason given.
        reason: String,
    },
    /// Guest never arrived.
    StayNoShow {
        /// Stay.
        stay_id: StayId,
    },
    /// Deposit money received.
    DepositReceived {
        /// Stay.
        stay_id: StayId,
        /// Deposit payment.
        payment_id: DepositPaymentId,
        /// Amount received.
        amount: Decimal,
    },
    /// Folio settled and closed.
    FolioClosed {
        /// Folio.
        folio_id: FolioId,
        /// Stay.
        stay_id: StayId,
        /// Balance at closing (non-zero only with an override).
        balance: Decimal,
    },
    /// Folio voided by a manager.
    FolioVoided {
        /// Folio.
        folio_id: FolioId,
        /// Stay.
        stay_id: StayId,
        /// Reason given.
        reason: String,
    },
    /// A category crossed an overbooking threshold.
    OverbookingAlertRaised {
        /// Alert.
        alert_id: OverbookingAlertId,
        /// Category.
        category_id: RoomCategoryId,
        /// Night.
        date: NaiveDate,
        /// Overbooked percentage.
        overbooking_percent: Decimal,
        /// Severity band.
        severity: Severity,
    },
    /// A night audit finished.
    AuditCompleted {
        /// Record.
        record_id: NightAuditId,
        /// Audited date.
        audit_date: NaiveDate,
        /// Outcome.
        status: AuditStatus,
        /// Number of discrepancies found.
        discrepancies: usize,
    },
}

impl DomainEvent {
    /// Event name as used by webhook subscribers.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BookingConfirmed { .. } => "booking_confirmed",
            Self::StayMoved { .. } => "stay_moved",
            Self::StayCheckedIn { .. } => "stay_checked_in",
            Self::StayCheckedOut { .. } => "stay_checked_out",
            Self::StayCancelled { .. } => "stay_cancelled",
            Self::StayNoShow { .. } => "stay_no_show",
            Self::DepositReceived { .. } => "deposit_received",
            Self::FolioClosed { .. } => "folio_closed",
            Self::FolioVoided { .. } => "folio_voided",
            Self::OverbookingAlertRaised { .. } => "overbooking_alert_raised",
            Self::AuditCompleted { .. } => "audit_completed",
        }
    }
}

/// An event with its routing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event id (for subscriber de-duplication).
    pub id: Uuid,
    /// Tenant the event belongs to.
    pub tenant_id: TenantId,
    /// Commit time.
    pub occurred_at: DateTime<Utc>,
    /// Payload.
    pub event: DomainEvent,
}

/// Sink delivery failure.
#[derive(Debug, thiserror::Error)]
#[error("event sink {sink} failed: {message}")]
pub struct SinkError {
    /// Sink name.
    pub sink: &'static str,
    /// What went wrong.
    pub message: String,
}

/// Receives dispatched events (webhook dispatcher, audit log writer, ...).
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Delivers one event.
    async fn deliver(&self, envelope: &EventEnvelope) -> Result<(), SinkError>;
}

/// Writes every event to the structured log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLog;

#[async_trait]
impl EventSink for TracingAuditLog {
    fn name(&self) -> &'static str {
        "audit_log"
    }

    async fn deliver(&self, envelope: &EventEnvelope) -> Result<(), SinkError> {
        let payload = serde_json::to_string(&envelope.event).map_err(|e| SinkError {
            sink: self.name(),
            message: e.to_string(),
        })?;
        tracing::info!(
            target: "innkeep::audit_log",
            event_id = %envelope.id,
            tenant_id = %envelope.tenant_id,
            event = envelope.event.name(),
            %payload,
            "domain event"
        );
        Ok(())
    }
}

/// Non-blocking handle used by services to publish events.
#[derive(Debug, Clone, Default)]
pub struct EventPublisher {
    tx: Option<mpsc::UnboundedSender<EventEnvelope>>,
}

impl EventPublisher {
    /// A publisher that drops every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// A publisher plus the raw receiving end of its queue.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EventEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Spawns a dispatcher delivering to `sinks` and returns its publisher.
    ///
    /// The dispatcher stops once every publisher clone is dropped.
    #[must_use]
    pub fn spawn(sinks: Vec<Arc<dyn EventSink>>) -> (Self, JoinHandle<()>) {
        let (publisher, rx) = Self::channel();
        let handle = tokio::spawn(dispatch(rx, sinks));
        (publisher, handle)
    }

    /// Queues an event. Never blocks and never fails the caller.
    pub fn publish(&self, tenant_id: TenantId, occurred_at: DateTime<Utc>, event: DomainEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        let name = event.name();
        let envelope = EventEnvelope {
            id: Uuid::now_v7(),
            tenant_id,
            occurred_at,
            event,
        };
        if tx.send(envelope).is_err() {
            tracing::warn!(%tenant_id, event = name, "event queue closed, event dropped");
        }
    }
}

async fn dispatch(mut rx: mpsc::UnboundedReceiver<EventEnvelope>, sinks: Vec<Arc<dyn EventSink>>) {
    while let Some(envelope) = rx.recv().await {
        for sink in &sinks {
            if let Err(e) = sink.deliver(&envelope).await {
                tracing::error!(
                    error = %e,
                    event_id = %envelope.id,
                    tenant_id = %envelope.tenant_id,
                    event = envelope.event.name(),
                    "event delivery failed"
                );
            }
        }
    }
    tracing::debug!("event dispatcher stopped");
}
