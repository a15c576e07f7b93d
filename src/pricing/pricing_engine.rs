// src/pricing/pricing_engine.rs

use bigdecimal::{BigDecimal, Zero};

/// Number of fractional digits of a currency amount (cents).
pub const CURRENCY_SCALE: i64 = 2;

/// Anything that can be priced as a line: a list price, a discount
/// percentage and a quantity.
///
/// Implemented by cart lines (priced with the product's current values) and by
/// the snapshots taken at checkout.
pub trait Priced {
    fn list_price(&self) -> &BigDecimal;
    fn discount_percent(&self) -> &BigDecimal;
    fn quantity(&self) -> i32;
}

/// Sum of line totals and line discounts for a set of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    pub total_price: BigDecimal,
    pub total_discount: BigDecimal,
}

/// Unit price after applying `discount_percent` percent off `list_price`.
/// Exact; may carry more than two fractional digits.
pub fn discounted_unit_price(list_price: &BigDecimal, discount_percent: &BigDecimal) -> BigDecimal {
    debug_assert!(*list_price >= BigDecimal::zero(), "list price must not be negative");
    debug_assert!(is_percentage(discount_percent), "discount must be within 0..=100");

    let hundred = BigDecimal::from(100);
    let remaining = &hundred - discount_percent;
    list_price * remaining / hundred
}

/// Discounted unit price times `quantity`, rounded half-up to cents once for
/// the whole line.
pub fn line_total(list_price: &BigDecimal, discount_percent: &BigDecimal, quantity: i32) -> BigDecimal {
    debug_assert!(quantity >= 1, "quantity must be positive");
    (discounted_unit_price(list_price, discount_percent) * BigDecimal::from(quantity)).round(CURRENCY_SCALE)
}

/// What the customer saves on a line: the undiscounted amount minus the line total.
pub fn line_discount(list_price: &BigDecimal, discount_percent: &BigDecimal, quantity: i32) -> BigDecimal {
    let undiscounted = list_price * BigDecimal::from(quantity);
    undiscounted - line_total(list_price, discount_percent, quantity)
}

/// Sums [`line_total`] and [`line_discount`] left to right, in the order the
/// lines are given. Callers pass lines in insertion order so results are
/// reproducible.
pub fn cart_totals<L: Priced>(lines: &[L]) -> Totals {
    let mut totals = Totals {
        total_price: BigDecimal::zero(),
        total_discount: BigDecimal::zero(),
    };
    for line in lines {
        totals.total_price += line_total(line.list_price(), line.discount_percent(), line.quantity());
        totals.total_discount += line_discount(line.list_price(), line.discount_percent(), line.quantity());
    }
    totals
}

/// Whether `value` is a percentage in `0..=100`.
pub fn is_percentage(value: &BigDecimal) -> bool {
    *value >= BigDecimal::zero() && *value <= BigDecimal::from(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    struct Line(BigDecimal, BigDecimal, i32);

    impl Priced for Line {
        fn list_price(&self) -> &BigDecimal {
            &self.0
        }
        fn discount_percent(&self) -> &BigDecimal {
            &self.1
        }
        fn quantity(&self) -> i32 {
            self.2
        }
    }

    #[rstest]
    #[case("100.00", "10", "90.00")]
    #[case("50.00", "0", "50.00")]
    #[case("19.99", "12.5", "17.49125")]
    #[case("0.05", "50", "0.025")]
    #[case("80.00", "100", "0")]
    fn discounted_unit_price_is_exact(#[case] price: &str, #[case] discount: &str, #[case] expected: &str) {
        assert_eq!(discounted_unit_price(&dec(price), &dec(discount)), dec(expected));
    }

    #[rstest]
    #[case("100.00", "10", 2, "180.00", "20.00")]
    #[case("50.00", "0", 1, "50.00", "0")]
    #[case("19.99", "12.5", 1, "17.49", "2.50")]
    #[case("19.99", "12.5", 3, "52.47", "7.50")]
    #[case("0.05", "50", 1, "0.03", "0.02")]
    #[case("0.05", "50", 10, "0.25", "0.25")]
    #[case("9.99", "15", 10, "84.92", "14.98")]
    #[case("0", "25", 4, "0", "0")]
    fn line_total_and_discount_partition_the_undiscounted_amount(
        #[case] price: &str,
        #[case] discount: &str,
        #[case] quantity: i32,
        #[case] expected_total: &str,
        #[case] expected_discount: &str,
    ) {
        let price = dec(price);
        let discount = dec(discount);
        let total = line_total(&price, &discount, quantity);
        let saved = line_discount(&price, &discount, quantity);

        assert_eq!(total, dec(expected_total));
        assert_eq!(saved, dec(expected_discount));
        assert!(total >= BigDecimal::zero());
        assert_eq!(&saved, &(&price * BigDecimal::from(quantity) - &total));
    }

    #[rstest]
    #[case("12.34", 1)]
    #[case("999.99", 7)]
    #[case("0.01", 10)]
    fn zero_discount_keeps_the_list_price(#[case] price: &str, #[case] quantity: i32) {
        let price = dec(price);
        let zero = BigDecimal::zero();
        assert_eq!(line_total(&price, &zero, quantity), &price * BigDecimal::from(quantity));
        assert_eq!(line_discount(&price, &zero, quantity), zero);
    }

    #[rstest]
    #[case("0.05", "50", 10)]
    #[case("9.99", "15", 10)]
    #[case("19.99", "12.5", 7)]
    fn line_total_rounds_once_per_line(#[case] price: &str, #[case] discount: &str, #[case] quantity: i32) {
        let price = dec(price);
        let discount = dec(discount);
        let exact = discounted_unit_price(&price, &discount) * BigDecimal::from(quantity);
        let total = line_total(&price, &discount, quantity);

        assert!((&total - &exact).abs() <= dec("0.005"));
        assert_eq!(total, total.with_scale(CURRENCY_SCALE));
    }

    #[test]
    fn full_discount_makes_the_line_free() {
        let price = dec("42.50");
        assert_eq!(line_total(&price, &dec("100"), 3), BigDecimal::zero());
        assert_eq!(line_discount(&price, &dec("100"), 3), dec("127.50"));
    }

    #[test]
    fn cart_totals_sums_every_line() {
        let lines = vec![
            Line(dec("100.00"), dec("10"), 2),
            Line(dec("50.00"), dec("0"), 1),
        ];
        let totals = cart_totals(&lines);
        assert_eq!(totals.total_price, dec("230"));
        assert_eq!(totals.total_discount, dec("20"));
    }

    #[test]
    fn cart_totals_of_nothing_is_zero() {
        let totals = cart_totals::<Line>(&[]);
        assert_eq!(totals.total_price, BigDecimal::zero());
        assert_eq!(totals.total_discount, BigDecimal::zero());
    }

    #[rstest]
    #[case("0", true)]
    #[case("100", true)]
    #[case("33.33", true)]
    #[case("-0.01", false)]
    #[case("100.01", false)]
    fn percentage_bounds(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_percentage(&dec(value)), expected);
    }
}
