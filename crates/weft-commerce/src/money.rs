//! Money type for representing monetary values.
//!
//! Amounts are stored in the smallest unit of the currency (paisa for INR)
//! as integers, which keeps the 18% tax and the flat shipping tiers exact
//! and avoids floating-point drift in totals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Supported currencies. The storefront trades in INR; the others exist for
/// display conversion of imported catalog data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    AED,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::AED => "AED",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::AED => "AED ",
        }
    }

    /// Get the number of subunit decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "AED" => Some(Currency::AED),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// `subunits` is the amount in the smallest currency unit (paisa for INR,
/// cents for USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub subunits: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from subunits.
    pub fn new(subunits: i64, currency: Currency) -> Self {
        Self { subunits, currency }
    }

    /// Create a Money value from a decimal major-unit amount.
    ///
    /// ```
    /// use weft_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(499.0, Currency::INR);
    /// assert_eq!(price.subunits, 49900);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        let subunits = (amount * multiplier as f64).round() as i64;
        Self::new(subunits, currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.subunits == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.subunits > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.subunits < 0
    }

    /// Get the absolute value.
    pub fn abs(&self) -> Self {
        Self::new(self.subunits.abs(), self.currency)
    }

    /// Convert to a decimal major-unit value.
    pub fn to_decimal(&self) -> f64 {
        let divisor = 10_i64.pow(self.currency.decimal_places());
        self.subunits as f64 / divisor as f64
    }

    /// Format as a display string (e.g., "₹499.00").
    pub fn display(&self) -> String {
        let decimal = self.to_decimal();
        let places = self.currency.decimal_places() as usize;
        format!("{}{:.places$}", self.currency.symbol(), decimal)
    }

    /// Format as a display string without symbol (e.g., "499.00").
    pub fn display_amount(&self) -> String {
        let decimal = self.to_decimal();
        let places = self.currency.decimal_places() as usize;
        format!("{:.places$}", decimal)
    }

    /// Add another Money value.
    ///
    /// # Panics
    /// Panics if currencies don't match or the sum overflows. Use `try_add`
    /// for fallible addition.
    pub fn add(&self, other: &Money) -> Money {
        self.try_add(other).expect("Currency mismatch in addition")
    }

    /// Try to add another Money value.
    ///
    /// Returns None if currencies don't match or the sum overflows i64.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let subunits = self.subunits.checked_add(other.subunits)?;
        Some(Money::new(subunits, self.currency))
    }

    /// Subtract another Money value.
    ///
    /// # Panics
    /// Panics if currencies don't match or the result overflows.
    pub fn subtract(&self, other: &Money) -> Money {
        self.try_subtract(other)
            .expect("Currency mismatch in subtraction")
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let subunits = self.subunits.checked_sub(other.subunits)?;
        Some(Money::new(subunits, self.currency))
    }

    /// Multiply by a scalar.
    ///
    /// # Panics
    /// Panics on overflow. Use `try_multiply` for fallible multiplication.
    pub fn multiply(&self, factor: i64) -> Money {
        self.try_multiply(factor)
            .expect("Overflow in money multiplication")
    }

    /// Try to multiply by a scalar, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        let subunits = self.subunits.checked_mul(factor)?;
        Some(Money::new(subunits, self.currency))
    }

    /// Multiply by a decimal factor, rounding half away from zero.
    ///
    /// This is the tax rule: `subtotal.multiply_decimal(0.18)` is
    /// round(subtotal × 0.18) in subunits.
    pub fn multiply_decimal(&self, factor: f64) -> Money {
        let subunits = (self.subunits as f64 * factor).round() as i64;
        Money::new(subunits, self.currency)
    }

    /// Calculate a percentage of this amount.
    pub fn percentage(&self, percent: f64) -> Money {
        self.multiply_decimal(percent / 100.0)
    }

    /// Try to sum an iterator of Money values.
    ///
    /// Returns None if any currency differs from `currency` or the sum
    /// overflows.
    pub fn try_sum<'a>(
        iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        let mut total = Money::zero(currency);
        for m in iter {
            total = total.try_add(m)?;
        }
        Some(total)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::add(&self, &other)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::subtract(&self, &other)
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, factor: i64) -> Money {
        self.multiply(factor)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_subunits() {
        let m = Money::new(49900, Currency::INR);
        assert_eq!(m.subunits, 49900);
        assert_eq!(m.currency, Currency::INR);
    }

    #[test]
    fn test_money_from_decimal() {
        let m = Money::from_decimal(499.0, Currency::INR);
        assert_eq!(m.subunits, 49900);

        let m = Money::from_decimal(1199.99, Currency::INR);
        assert_eq!(m.subunits, 119999);
    }

    #[test]
    fn test_money_to_decimal() {
        let m = Money::new(49900, Currency::INR);
        assert!((m.to_decimal() - 499.0).abs() < 0.001);
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(49900, Currency::INR);
        assert_eq!(m.display(), "\u{20b9}499.00");

        let m = Money::new(1050, Currency::USD);
        assert_eq!(m.display(), "$10.50");
    }

    #[test]
    fn test_money_addition() {
        let a = Money::new(100000, Currency::INR);
        let b = Money::new(50000, Currency::INR);
        let c = a + b;
        assert_eq!(c.subunits, 150000);
    }

    #[test]
    fn test_money_subtraction() {
        let a = Money::new(100000, Currency::INR);
        let b = Money::new(30000, Currency::INR);
        let c = a.subtract(&b);
        assert_eq!(c.subunits, 70000);
    }

    #[test]
    fn test_money_multiply() {
        let m = Money::new(50000, Currency::INR);
        let doubled = m.multiply(2);
        assert_eq!(doubled.subunits, 100000);
    }

    #[test]
    fn test_try_multiply_overflow() {
        let m = Money::new(i64::MAX / 2, Currency::INR);
        assert!(m.try_multiply(2).is_some());
        assert!(m.try_multiply(3).is_none());
    }

    #[test]
    fn test_try_add_overflow() {
        let a = Money::new(i64::MAX, Currency::INR);
        let b = Money::new(1, Currency::INR);
        assert!(a.try_add(&b).is_none());
    }

    #[test]
    fn test_try_sum() {
        let values = vec![
            Money::new(100000, Currency::INR),
            Money::new(120000, Currency::INR),
        ];
        let total = Money::try_sum(values.iter(), Currency::INR).unwrap();
        assert_eq!(total.subunits, 220000);

        let mixed = vec![
            Money::new(100, Currency::INR),
            Money::new(100, Currency::USD),
        ];
        assert!(Money::try_sum(mixed.iter(), Currency::INR).is_none());
    }

    #[test]
    fn test_tax_rounding() {
        // round(220000 * 0.18) = 39600 exactly
        let subtotal = Money::new(220000, Currency::INR);
        assert_eq!(subtotal.multiply_decimal(0.18).subunits, 39600);

        // round(99 * 0.18) = round(17.82) = 18
        let odd = Money::new(99, Currency::INR);
        assert_eq!(odd.multiply_decimal(0.18).subunits, 18);
    }

    #[test]
    fn test_money_percentage() {
        let m = Money::new(1000000, Currency::INR);
        let part = m.percentage(18.0);
        assert_eq!(part.subunits, 180000);
    }

    #[test]
    #[should_panic(expected = "Currency mismatch")]
    fn test_money_currency_mismatch() {
        let inr = Money::new(1000, Currency::INR);
        let usd = Money::new(1000, Currency::USD);
        let _ = inr + usd;
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("INR"), Some(Currency::INR));
        assert_eq!(Currency::from_code("usd"), Some(Currency::USD));
        assert_eq!(Currency::from_code("XYZ"), None);
    }
}
