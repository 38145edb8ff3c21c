//! Monetary helpers.
//!
//! All monetary values are [`Decimal`]s held to two decimal places, rounded
//! half-up (midpoint away from zero). Every derived amount goes through
//! [`round_money`] so stored totals never carry stray precision.

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

/// Round a monetary amount to two decimal places, half-up.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Total for one order line: quantity times unit price, rounded.
pub fn line_total(quantity: u32, unit_price: Decimal) -> Decimal {
    round_money(Decimal::from(quantity) * unit_price)
}

/// Apply a fractional rate (e.g. a tax rate of `0.1`) to an amount, rounded.
pub fn apply_rate(amount: Decimal, rate: Decimal) -> Decimal {
    round_money(amount * rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_money(dec!(2.005)), dec!(2.01));
        assert_eq!(round_money(dec!(2.004)), dec!(2.00));
        assert_eq!(round_money(dec!(2.0049999)), dec!(2.00));
    }

    #[test]
    fn rounds_negative_amounts_away_from_zero() {
        assert_eq!(round_money(dec!(-2.005)), dec!(-2.01));
        assert_eq!(round_money(dec!(-2.004)), dec!(-2.00));
    }

    #[test]
    fn line_total_multiplies_and_rounds() {
        assert_eq!(line_total(2, dec!(15.00)), dec!(30.00));
        assert_eq!(line_total(4, dec!(3.00)), dec!(12.00));
        assert_eq!(line_total(3, dec!(0.333)), dec!(1.00));
    }

    #[test]
    fn apply_rate_rounds_result() {
        assert_eq!(apply_rate(dec!(42.00), dec!(0.1)), dec!(4.20));
        assert_eq!(apply_rate(dec!(19.99), dec!(0.0825)), dec!(1.65));
        assert_eq!(apply_rate(dec!(100.00), Decimal::ZERO), dec!(0.00));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: rounding never moves an amount by more than half a cent.
            #[test]
            fn rounding_error_is_bounded(mills in -10_000_000i64..10_000_000i64) {
                let amount = Decimal::new(mills, 3);
                let rounded = round_money(amount);

                prop_assert!(rounded.scale() <= 2);
                prop_assert!((rounded - amount).abs() <= dec!(0.005));
            }

            /// Property: amounts already at two decimal places round to themselves.
            #[test]
            fn two_place_amounts_are_fixed_points(cents in -1_000_000i64..1_000_000i64) {
                let amount = Decimal::new(cents, 2);
                prop_assert_eq!(round_money(amount), amount);
            }
        }
    }
}
