// Validation utilities module
// Provides custom validation functions for domain-specific rules

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates that a monetary amount is zero or positive (discounts, totals)
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        Err(ValidationError::new("amount_must_not_be_negative"))
    } else {
        Ok(())
    }
}

/// Validates that a requested quantity is a positive integer
pub fn validate_positive_quantity(quantity: &i32) -> Result<(), ValidationError> {
    if *quantity <= 0 {
        Err(ValidationError::new("quantity_must_be_positive"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_non_negative_amount_accepts_zero() {
        assert!(validate_non_negative_amount(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(&dec!(5.50)).is_ok());
    }

    #[test]
    fn test_non_negative_amount_rejects_negative() {
        assert!(validate_non_negative_amount(&dec!(-0.01)).is_err());
    }

    #[test]
    fn test_positive_quantity() {
        assert!(validate_positive_quantity(&1).is_ok());
        assert!(validate_positive_quantity(&0).is_err());
        assert!(validate_positive_quantity(&-1).is_err());
    }
}
