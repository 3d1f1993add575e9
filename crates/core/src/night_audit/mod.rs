//! Night audit: the daily, run-once reconciliation batch.

pub mod error;
pub mod service;
pub mod tally;
pub mod types;

pub use error::AuditError;
pub use service::{AuditStores, NightAuditEngine};
pub use types::{AuditStatus, AuditSummary, Discrepancy, DiscrepancyKind, NightAuditRecord, SmartAlert};
