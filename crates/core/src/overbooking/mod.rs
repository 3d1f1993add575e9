//! Overbooking monitor.
//!
//! Booked-vs-capacity per room category and night, threshold bands and
//! alerts that stay unique per (tenant, category, date) until resolved.

pub mod calculator;
pub mod error;
pub mod service;
pub mod types;

pub use calculator::{EffectivePolicy, OverbookingCalculator};
pub use error::OverbookingError;
pub use service::OverbookingMonitor;
pub use types::{
    AlertStatus, OverbookingAlert, OverbookingSetting, OverbookingSnapshot, SettingInput, Severity,
};
