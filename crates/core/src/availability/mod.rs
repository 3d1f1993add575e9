//! Availability index: per-room, per-day occupancy.
//!
//! - Half-open overlap: a stay occupies night `d` iff `check_in <= d < check_out`
//! - Day status precedence and primary-stay tie-break
//! - The post-query filter used by every coarse stay listing

mod error;
mod filter;
mod index;
mod service;
mod types;

pub use error::AvailabilityError;
pub use filter::PostQueryFilter;
pub use index::build_room_days;
pub use service::AvailabilityIndex;
pub use types::{AvailabilityReport, AvailabilityTarget, DayStatus, RoomAvailability, RoomDay};
