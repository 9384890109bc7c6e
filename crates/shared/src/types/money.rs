//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` quantized to two decimal places
//! (the ledger stores 15 significant digits, 2 dp).

use rust_decimal::Decimal;

/// Number of decimal places every persisted monetary amount carries.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Rounds an amount to two decimal places using banker's rounding.
#[must_use]
pub fn quantize_2dp(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_DECIMAL_PLACES)
}

/// Returns true if the amount is already exact at two decimal places.
///
/// `Decimal` equality ignores trailing zeros, so `1.50` and `1.5000` both
/// pass while `1.505` does not.
#[must_use]
pub fn is_quantized_2dp(amount: Decimal) -> bool {
    amount == quantize_2dp(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantize_rounds_to_two_places() {
        assert_eq!(quantize_2dp(dec!(10.005)), dec!(10.00)); // banker's rounding
        assert_eq!(quantize_2dp(dec!(10.015)), dec!(10.02));
        assert_eq!(quantize_2dp(dec!(10.1)), dec!(10.1));
    }

    #[rstest]
    #[case(dec!(100.00), true)]
    #[case(dec!(100.5), true)]
    #[case(dec!(100), true)]
    #[case(dec!(1.5000), true)] // trailing zeros are fine
    #[case(dec!(100.505), false)]
    #[case(dec!(0.001), false)]
    #[case(dec!(-10.25), true)]
    #[case(dec!(-10.255), false)]
    fn test_is_quantized(#[case] amount: Decimal, #[case] expected: bool) {
        assert_eq!(is_quantized_2dp(amount), expected);
    }
}
