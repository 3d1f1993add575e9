//! Booking orchestrator and the stay (reservation) model.

pub mod error;
pub mod service;
pub mod types;

pub use error::BookingError;
pub use service::BookingOrchestrator;
pub use types::{
    CheckOutInput, CreateStayInput, GuestInfo, MoveStayInput, Stay, StayFilter, StayStatus,
};
