//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{BALANCE_EPSILON, is_settled, percent_of, round_money};
pub use pagination::{PageRequest, PageResponse};
