//! Money utilities.
//!
//! ## Overview
//!
//! Prices and totals are [`Decimal`] values with two decimal places. No
//! floating point is involved anywhere in price or total arithmetic.
//!
//! ## Rounding
//!
//! Results are rounded to cents with the midpoint rounded away from zero
//! (`12.345` becomes `12.35`).
//!
//! ## Examples
//!
//! ```
//! use bistro::types::money::{apply_coupon, format_currency, parse_amount};
//!
//! let total = parse_amount("40,00").unwrap();
//! let discounted = apply_coupon(total, parse_amount("15").unwrap()).unwrap();
//!
//! assert_eq!(format_currency(discounted), "R$34.00");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Decimal places kept for money values
pub const CENTS_DP: u32 = 2;

/// Coupons are percentages in `0..=100`
pub const MAX_COUPON_PERCENT: Decimal = Decimal::ONE_HUNDRED;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Parse a user-entered amount.
///
/// Accepts either `.` or `,` as the decimal separator.
///
/// # Returns
///
/// * `Some(Decimal)` - The parsed amount
/// * `None` - If parsing fails or the value is negative
///
/// # Example
///
/// ```
/// use bistro::types::money::parse_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_amount("12.50"), Some(Decimal::new(1250, 2)));
/// assert_eq!(parse_amount("12,50"), Some(Decimal::new(1250, 2)));
/// assert_eq!(parse_amount("-1"), None);
/// assert_eq!(parse_amount("abc"), None);
/// ```
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let normalized = s.trim().replace(',', ".");
    let amount = Decimal::from_str(&normalized).ok()?;
    if amount.is_sign_negative() {
        return None;
    }
    Some(amount)
}

/// Round to cents, midpoint away from zero
///
/// # Example
///
/// ```
/// use bistro::types::money::round_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_currency(Decimal::new(12345, 3)), Decimal::new(1235, 2));
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENTS_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Format with the currency symbol and exactly two decimals
///
/// # Example
///
/// ```
/// use bistro::types::money::format_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_currency(Decimal::new(5, 0)), "R$5.00");
/// assert_eq!(format_currency(Decimal::new(1999, 2)), "R$19.99");
/// ```
pub fn format_currency(amount: Decimal) -> String {
    format!("R${:.2}", round_currency(amount))
}

// ============================================================================
// Arithmetic Functions
// ============================================================================

/// Price of `quantity` units
///
/// # Returns
///
/// * `Some(Decimal)` - `unit_price * quantity`
/// * `None` - If overflow occurs
pub fn line_total(unit_price: Decimal, quantity: u32) -> Option<Decimal> {
    unit_price.checked_mul(Decimal::from(quantity))
}

/// Apply a percentage coupon: `total * (1 - percent / 100)`, rounded to cents.
///
/// # Returns
///
/// * `Some(Decimal)` - The discounted total
/// * `None` - If `percent` is outside `0..=100`
///
/// # Example
///
/// ```
/// use bistro::types::money::apply_coupon;
/// use rust_decimal::Decimal;
///
/// let total = Decimal::new(10000, 2); // 100.00
/// assert_eq!(apply_coupon(total, Decimal::new(10, 0)), Some(Decimal::new(9000, 2)));
/// assert_eq!(apply_coupon(total, Decimal::new(101, 0)), None);
/// ```
pub fn apply_coupon(total: Decimal, percent: Decimal) -> Option<Decimal> {
    if percent.is_sign_negative() || percent > MAX_COUPON_PERCENT {
        return None;
    }

    let factor = Decimal::ONE.checked_sub(percent.checked_div(Decimal::ONE_HUNDRED)?)?;
    let discounted = total.checked_mul(factor)?;
    Some(round_currency(discounted))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_basic() {
        assert_eq!(parse_amount("1"), Some(Decimal::ONE));
        assert_eq!(parse_amount("0.5"), Some(Decimal::new(5, 1)));
        assert_eq!(parse_amount(" 7,25 "), Some(Decimal::new(725, 2)));
    }

    #[test]
    fn test_parse_amount_edge_cases() {
        assert_eq!(parse_amount("0"), Some(Decimal::ZERO));

        // Negative values should return None
        assert_eq!(parse_amount("-0.01"), None);

        // Invalid strings should return None
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("R$3"), None);
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_currency(Decimal::new(1004, 3)), Decimal::new(100, 2));
        assert_eq!(round_currency(Decimal::new(7, 0)), Decimal::new(7, 0));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Decimal::ZERO), "R$0.00");
        assert_eq!(format_currency(Decimal::new(35, 1)), "R$3.50");
        assert_eq!(format_currency(Decimal::new(12345, 3)), "R$12.35");
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Decimal::new(450, 2), 3), Some(Decimal::new(1350, 2)));
        assert_eq!(line_total(Decimal::new(450, 2), 0), Some(Decimal::ZERO));
        assert_eq!(line_total(Decimal::MAX, 2), None);
    }

    #[test]
    fn test_apply_coupon() {
        let total = Decimal::new(3333, 2); // 33.33

        assert_eq!(apply_coupon(total, Decimal::ZERO), Some(total));
        assert_eq!(apply_coupon(total, Decimal::ONE_HUNDRED), Some(Decimal::ZERO));
        // 33.33 * 0.85 = 28.3305
        assert_eq!(apply_coupon(total, Decimal::new(15, 0)), Some(Decimal::new(2833, 2)));
    }

    #[test]
    fn test_apply_coupon_out_of_range() {
        let total = Decimal::new(1000, 2);

        assert_eq!(apply_coupon(total, Decimal::new(-5, 0)), None);
        assert_eq!(apply_coupon(total, Decimal::new(1001, 1)), None);
    }
}
