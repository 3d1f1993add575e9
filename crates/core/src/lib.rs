//! Core business logic for Innkeep.
//!
//! This crate holds the booking and folio rules with ZERO web or database
//! dependencies. Storage is reached through the async ports in
//! [`repository`]; time through [`clock::Clock`]; outbound notifications
//! through [`events::EventPublisher`].
//!
//! # Modules
//!
//! - `availability` - Per-room, per-night availability index
//! - `booking` - Stay lifecycle orchestration
//! - `deposit` - Deposit policy resolution and deposit payments
//! - `overbooking` - Category capacity monitoring and alerts
//! - `folio` - Guest folio ledger
//! - `night_audit` - Daily reconciliation batch

pub mod actor;
pub mod availability;
pub mod booking;
pub mod calendar;
pub mod clock;
pub mod deposit;
mod error;
pub mod events;
pub mod extension;
pub mod folio;
pub mod night_audit;
pub mod overbooking;
pub mod repository;
pub mod room;
pub mod services;
pub mod settings;
pub mod shift;

#[cfg(test)]
mod testing;

pub use actor::Actor;
pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{DomainEvent, EventPublisher};
pub use services::{Repositories, Services};
pub use settings::CoreSettings;
