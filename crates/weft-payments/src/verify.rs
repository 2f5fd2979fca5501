//! Signature and amount checks for payment verification.
//!
//! The gateway signs `"{remote_order_id}|{payment_id}"` with the key secret
//! and hands the hex digest to the client, who posts it back to us. We
//! recompute the HMAC server-side and compare in constant time; nothing the
//! client sends is trusted.

use crate::error::PaymentError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use weft_commerce::Money;

type HmacSha256 = Hmac<Sha256>;

/// Largest amount accepted for a single order, in major units.
pub const MAX_ORDER_AMOUNT: f64 = 1_000_000.0;

/// Allowed drift between the client-stated amount and the order total,
/// in major units. Covers float formatting on the client side.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Check a client-claimed payment signature against the server-held secret.
pub fn verify_signature(
    key_secret: &str,
    remote_order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<(), PaymentError> {
    let claimed = hex::decode(signature).map_err(|_| PaymentError::VerificationFailed)?;

    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .map_err(|_| PaymentError::ConfigError("invalid gateway secret".to_string()))?;
    mac.update(format!("{}|{}", remote_order_id, payment_id).as_bytes());
    mac.verify_slice(&claimed)
        .map_err(|_| PaymentError::VerificationFailed)
}

/// Validate a client-stated amount against the order total.
///
/// The amount must be positive, under [`MAX_ORDER_AMOUNT`], and within
/// [`AMOUNT_TOLERANCE`] of the total.
pub fn validate_amount(requested: f64, order_total: Money) -> Result<(), PaymentError> {
    if !requested.is_finite() || requested <= 0.0 {
        return Err(PaymentError::InvalidAmount(
            "amount must be positive".to_string(),
        ));
    }
    if requested > MAX_ORDER_AMOUNT {
        return Err(PaymentError::InvalidAmount(
            "amount exceeds the per-order limit".to_string(),
        ));
    }

    let expected = order_total.to_decimal();
    if (requested - expected).abs() > AMOUNT_TOLERANCE {
        return Err(PaymentError::AmountMismatch {
            expected: format!("{:.2}", expected),
            got: format!("{:.2}", requested),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_commerce::Currency;

    const SECRET: &str = "rzp_test_secret_4yX2mQ";

    fn sign(secret: &str, remote_order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}|{}", remote_order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let signature = sign(SECRET, "order_Nxq3pFo7a2bc1d", "pay_Nxq5rT8kWm");
        assert!(
            verify_signature(SECRET, "order_Nxq3pFo7a2bc1d", "pay_Nxq5rT8kWm", &signature).is_ok()
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = sign("some_other_secret", "order_Nxq3pFo7a2bc1d", "pay_Nxq5rT8kWm");
        assert!(matches!(
            verify_signature(SECRET, "order_Nxq3pFo7a2bc1d", "pay_Nxq5rT8kWm", &signature),
            Err(PaymentError::VerificationFailed)
        ));
    }

    #[test]
    fn test_tampered_payment_id_rejected() {
        let signature = sign(SECRET, "order_Nxq3pFo7a2bc1d", "pay_Nxq5rT8kWm");
        assert!(matches!(
            verify_signature(SECRET, "order_Nxq3pFo7a2bc1d", "pay_Attacker01", &signature),
            Err(PaymentError::VerificationFailed)
        ));
    }

    #[test]
    fn test_single_character_mutation_rejected() {
        let signature = sign(SECRET, "order_Nxq3pFo7a2bc1d", "pay_Nxq5rT8kWm");
        let mut bytes = signature.into_bytes();
        let last = bytes.last_mut().unwrap();
        *last = if *last == b'0' { b'1' } else { b'0' };
        let mutated = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            verify_signature(SECRET, "order_Nxq3pFo7a2bc1d", "pay_Nxq5rT8kWm", &mutated),
            Err(PaymentError::VerificationFailed)
        ));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert!(matches!(
            verify_signature(SECRET, "order_x", "pay_y", "not-hex-at-all"),
            Err(PaymentError::VerificationFailed)
        ));
    }

    #[test]
    fn test_amount_exact_match() {
        let total = Money::new(269500, Currency::INR);
        assert!(validate_amount(2695.0, total).is_ok());
    }

    #[test]
    fn test_amount_within_tolerance() {
        let total = Money::new(269500, Currency::INR);
        assert!(validate_amount(2695.005, total).is_ok());
        assert!(validate_amount(2694.995, total).is_ok());
    }

    #[test]
    fn test_amount_outside_tolerance() {
        let total = Money::new(269500, Currency::INR);
        assert!(matches!(
            validate_amount(2695.02, total),
            Err(PaymentError::AmountMismatch { .. })
        ));
    }

    #[test]
    fn test_amount_must_be_positive() {
        let total = Money::new(269500, Currency::INR);
        assert!(matches!(
            validate_amount(0.0, total),
            Err(PaymentError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(-1.0, total),
            Err(PaymentError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_amount_ceiling() {
        let total = Money::new(100_000_001_00, Currency::INR);
        assert!(matches!(
            validate_amount(1_000_000.01, total),
            Err(PaymentError::InvalidAmount(_))
        ));
    }
}
