//! Order financials.
//!
//! This is the ONE place subtotal/shipping/tax/total are derived. Order
//! creation routes every amount through [`calculate_totals`], and checkout
//! reads the result off the written order; a single implementation is what
//! stops the two from drifting apart on rounding.

use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// GST applied to the subtotal.
pub const TAX_RATE: f64 = 0.18;

/// How the order ships. Fees are flat per method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    /// Flat ₹99.
    #[default]
    Standard,
    /// Flat ₹199. Older clients still send "express".
    #[serde(alias = "express")]
    Expedited,
    /// Free store pickup.
    Pickup,
}

impl ShippingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingMethod::Standard => "standard",
            ShippingMethod::Expedited => "expedited",
            ShippingMethod::Pickup => "pickup",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ShippingMethod::Standard => "Standard Delivery",
            ShippingMethod::Expedited => "Expedited Delivery",
            ShippingMethod::Pickup => "Store Pickup",
        }
    }

    /// Parse a method string, accepting the legacy "express" spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(ShippingMethod::Standard),
            "expedited" | "express" => Some(ShippingMethod::Expedited),
            "pickup" => Some(ShippingMethod::Pickup),
            _ => None,
        }
    }

    /// Flat shipping fee for this method.
    pub fn fee(&self, currency: Currency) -> Money {
        let subunits = match self {
            ShippingMethod::Standard => 9900,
            ShippingMethod::Expedited => 19900,
            ShippingMethod::Pickup => 0,
        };
        Money::new(subunits, currency)
    }
}

/// How the order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Hosted checkout through the payment gateway.
    #[default]
    Online,
    /// Collected by the courier; the order is marked paid at placement.
    #[serde(alias = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "online" => Some(PaymentMethod::Online),
            "cash_on_delivery" | "cod" => Some(PaymentMethod::CashOnDelivery),
            _ => None,
        }
    }

    pub fn is_cash_on_delivery(&self) -> bool {
        matches!(self, PaymentMethod::CashOnDelivery)
    }
}

/// Derived order financials.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OrderTotals {
    /// Σ(unit_price × quantity) over the lines.
    pub subtotal: Money,
    /// Flat fee for the chosen method.
    pub shipping: Money,
    /// round(subtotal × TAX_RATE).
    pub tax: Money,
    /// subtotal + shipping + tax.
    pub total: Money,
}

/// Derive shipping, tax, and total from a subtotal and shipping method.
pub fn calculate_totals(
    subtotal: Money,
    method: ShippingMethod,
) -> Result<OrderTotals, CommerceError> {
    if subtotal.is_negative() {
        return Err(CommerceError::ValidationError(
            "subtotal cannot be negative".to_string(),
        ));
    }

    let shipping = method.fee(subtotal.currency);
    let tax = subtotal.multiply_decimal(TAX_RATE);
    let total = subtotal
        .try_add(&shipping)
        .and_then(|s| s.try_add(&tax))
        .ok_or(CommerceError::Overflow)?;

    Ok(OrderTotals {
        subtotal,
        shipping,
        tax,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr(subunits: i64) -> Money {
        Money::new(subunits, Currency::INR)
    }

    #[test]
    fn test_shipping_fees() {
        assert_eq!(ShippingMethod::Standard.fee(Currency::INR), inr(9900));
        assert_eq!(ShippingMethod::Expedited.fee(Currency::INR), inr(19900));
        assert_eq!(ShippingMethod::Pickup.fee(Currency::INR), inr(0));
    }

    #[test]
    fn test_totals_for_standard_order() {
        // 2×500 + 1×1200 = 2200; shipping 99; tax 396; total 2695.
        let totals = calculate_totals(inr(220000), ShippingMethod::Standard).unwrap();
        assert_eq!(totals.subtotal, inr(220000));
        assert_eq!(totals.shipping, inr(9900));
        assert_eq!(totals.tax, inr(39600));
        assert_eq!(totals.total, inr(269500));
    }

    #[test]
    fn test_totals_for_pickup() {
        let totals = calculate_totals(inr(100000), ShippingMethod::Pickup).unwrap();
        assert_eq!(totals.shipping, inr(0));
        assert_eq!(totals.tax, inr(18000));
        assert_eq!(totals.total, inr(118000));
    }

    #[test]
    fn test_tax_rounds_to_nearest_paisa() {
        // 73 paisa × 0.18 = 13.14 → 13
        let totals = calculate_totals(inr(73), ShippingMethod::Pickup).unwrap();
        assert_eq!(totals.tax, inr(13));

        // 75 paisa × 0.18 = 13.5 → 14
        let totals = calculate_totals(inr(75), ShippingMethod::Pickup).unwrap();
        assert_eq!(totals.tax, inr(14));
    }

    #[test]
    fn test_zero_subtotal() {
        let totals = calculate_totals(inr(0), ShippingMethod::Standard).unwrap();
        assert_eq!(totals.tax, inr(0));
        assert_eq!(totals.total, inr(9900));
    }

    #[test]
    fn test_negative_subtotal_rejected() {
        let result = calculate_totals(inr(-1), ShippingMethod::Standard);
        assert!(matches!(result, Err(CommerceError::ValidationError(_))));
    }

    #[test]
    fn test_express_alias_parses_as_expedited() {
        assert_eq!(
            ShippingMethod::parse("express"),
            Some(ShippingMethod::Expedited)
        );
        assert_eq!(
            ShippingMethod::parse("Standard"),
            Some(ShippingMethod::Standard)
        );
        assert_eq!(ShippingMethod::parse("drone"), None);

        let parsed: ShippingMethod = serde_json::from_str("\"express\"").unwrap();
        assert_eq!(parsed, ShippingMethod::Expedited);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("cod"), Some(PaymentMethod::CashOnDelivery));
        assert_eq!(PaymentMethod::parse("online"), Some(PaymentMethod::Online));
        assert_eq!(PaymentMethod::parse("barter"), None);
    }
}
