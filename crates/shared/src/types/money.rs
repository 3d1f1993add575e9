//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every tenant books in a single currency, so amounts are plain `Decimal`s
//! and only the rounding rules live here.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for stored amounts (currency minor units).
pub const MONEY_SCALE: u32 = 2;

/// Tolerance used when deciding whether a balance is settled.
pub const BALANCE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds an amount to currency minor units, half-up (away from zero).
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `percent` % of `amount`, unrounded.
#[must_use]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

/// Returns true when `amount` is within `epsilon` of zero.
#[must_use]
pub fn is_settled(amount: Decimal, epsilon: Decimal) -> bool {
    amount.abs() < epsilon
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(1.005), dec!(1.01))]
    #[case(dec!(1.004), dec!(1.00))]
    #[case(dec!(-1.005), dec!(-1.01))]
    #[case(dec!(3150), dec!(3150.00))]
    #[case(dec!(0.125), dec!(0.13))]
    fn test_round_money_half_up(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(50000), dec!(10)), dec!(5000));
        assert_eq!(percent_of(dec!(3000), dec!(5)), dec!(150));
    }

    #[test]
    fn test_balance_epsilon_is_one_cent() {
        assert_eq!(BALANCE_EPSILON, dec!(0.01));
    }

    #[test]
    fn test_is_settled() {
        assert!(is_settled(dec!(0), BALANCE_EPSILON));
        assert!(is_settled(dec!(0.009), BALANCE_EPSILON));
        assert!(!is_settled(dec!(0.01), BALANCE_EPSILON));
        assert!(!is_settled(dec!(-5), BALANCE_EPSILON));
    }
}
