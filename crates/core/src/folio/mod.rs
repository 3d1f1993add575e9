//! Folio ledger: per-stay charges, payments and running balance.
//!
//! Invariants:
//! - `balance == total_charges - total_payments` at every stored state
//! - status is one-way `open → {closed, voided}`
//! - items are only accepted while `open`

pub mod error;
pub mod ledger;
pub mod service;
pub mod types;

#[cfg(test)]
mod ledger_props;

pub use error::FolioError;
pub use ledger::FolioLedger;
pub use service::FolioService;
pub use types::{
    Charge, ChargeCategory, Folio, FolioAuditEntry, FolioSnapshot, FolioStatus, NewCharge, NewPayment,
    Payment, PaymentMethod, PaymentStatus,
};
