use rust_decimal::Decimal;

/// Pure decimal arithmetic for sale pricing
///
/// All figures stay in `Decimal`; nothing here rounds. Rounding at display
/// time is the client's concern.
pub struct PricingCalculator;

impl PricingCalculator {
    /// Tax carried by one unit: `selling_price * tax_percentage / 100`
    pub fn unit_tax(selling_price: Decimal, tax_percentage: Decimal) -> Decimal {
        selling_price * tax_percentage / Decimal::from(100)
    }

    /// Pre-tax line total for a requested quantity
    pub fn line_total(quantity: i32, selling_price: Decimal) -> Decimal {
        Decimal::from(quantity) * selling_price
    }

    /// Tax for a full line
    pub fn line_tax(quantity: i32, unit_tax: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_tax
    }

    /// Cost of a slice priced at its batch's purchase price
    pub fn line_cost(quantity: i32, purchase_price: Decimal) -> Decimal {
        Decimal::from(quantity) * purchase_price
    }

    /// Grand total; discount is subtracted as-is and may drive the total
    /// negative when it exceeds subtotal plus tax.
    pub fn total_amount(subtotal: Decimal, tax_amount: Decimal, discount_amount: Decimal) -> Decimal {
        subtotal + tax_amount - discount_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unit_tax() {
        assert_eq!(PricingCalculator::unit_tax(dec!(10.00), dec!(10)), dec!(1.00));
        assert_eq!(PricingCalculator::unit_tax(dec!(4.50), dec!(0)), dec!(0.00));
        assert_eq!(PricingCalculator::unit_tax(dec!(99.99), dec!(18)), dec!(17.9982));
    }

    // Worked example: 8 units at 10.00 with 10% tax, drawn 5 from a 6.00
    // batch and 3 from a 6.50 batch.
    #[test]
    fn test_cross_batch_sale_figures() {
        let price = dec!(10.00);
        let tax_pct = dec!(10);

        let subtotal = PricingCalculator::line_total(8, price);
        let tax = PricingCalculator::line_tax(8, PricingCalculator::unit_tax(price, tax_pct));
        let cost = PricingCalculator::line_cost(5, dec!(6.00))
            + PricingCalculator::line_cost(3, dec!(6.50));
        let total = PricingCalculator::total_amount(subtotal, tax, Decimal::ZERO);

        assert_eq!(subtotal, dec!(80.00));
        assert_eq!(tax, dec!(8.00));
        assert_eq!(cost, dec!(49.50));
        assert_eq!(total, dec!(88.00));
        assert_eq!(total - cost, dec!(38.50));
    }

    #[test]
    fn test_discount_can_exceed_total() {
        let total = PricingCalculator::total_amount(dec!(10.00), dec!(1.00), dec!(15.00));
        assert_eq!(total, dec!(-4.00));
    }

    proptest! {
        #[test]
        fn prop_line_total_scales_linearly(quantity in 1i32..10_000, cents in 0i64..100_000) {
            let price = Decimal::new(cents, 2);
            let total = PricingCalculator::line_total(quantity, price);
            prop_assert_eq!(total, Decimal::from(quantity) * price);
        }

        #[test]
        fn prop_total_identity(
            subtotal_cents in 0i64..10_000_000,
            tax_cents in 0i64..1_000_000,
            discount_cents in 0i64..1_000_000,
        ) {
            let subtotal = Decimal::new(subtotal_cents, 2);
            let tax = Decimal::new(tax_cents, 2);
            let discount = Decimal::new(discount_cents, 2);
            let total = PricingCalculator::total_amount(subtotal, tax, discount);
            prop_assert_eq!(total + discount, subtotal + tax);
        }
    }
}
