//! Deposit policies and deposit payments.
//!
//! Policy matching goes from most to least specific:
//! category + rate plan, category, rate plan, tenant default.

pub mod error;
pub mod resolver;
pub mod service;
pub mod types;

#[cfg(test)]
mod resolver_props;

pub use error::DepositError;
pub use resolver::DepositResolver;
pub use service::DepositService;
pub use types::{
    DepositContext, DepositPayment, DepositPaymentStatus, DepositPolicy, DepositQuote, DepositSummary,
    DepositType, NewDepositPolicy, PolicyScope,
};
