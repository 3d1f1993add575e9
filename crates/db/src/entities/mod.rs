//! `SeaORM` entities for the relational room inventory.

pub mod room_blocks;
pub mod room_categories;
pub mod rooms;
