//! Relational repositories.
//!
//! Only the room inventory has a relational home; operational documents live
//! in [`crate::document::DocumentStore`].

pub mod room;

pub use room::SeaRoomRepository;
