//! Component configuration from Spin variables.
//!
//! Secrets (gateway keys, courier credentials) come from the Spin variable
//! store so they never land in the build. Off-Spin, placeholders keep the
//! wiring testable.

use anyhow::{Context, Result};
use weft_payments::GatewayConfig;
use weft_shipping::CourierConfig;

/// Payment gateway settings.
pub fn gateway() -> Result<GatewayConfig> {
    let key_id = variable("payment_key_id")?;
    let key_secret = variable("payment_key_secret")?;
    let base_url = variable("payment_base_url")?;
    Ok(GatewayConfig::new(key_id, key_secret, base_url)?)
}

/// Courier API settings.
pub fn courier() -> Result<CourierConfig> {
    let email = variable("courier_email")?;
    let password = variable("courier_password")?;
    let base_url = variable("courier_base_url")?;
    Ok(CourierConfig::new(email, password, base_url)?)
}

#[cfg(target_arch = "wasm32")]
fn variable(name: &str) -> Result<String> {
    spin_sdk::variables::get(name).with_context(|| format!("variable {name} not set"))
}

#[cfg(not(target_arch = "wasm32"))]
fn variable(name: &str) -> Result<String> {
    let env_name = format!("SPIN_VARIABLE_{}", name.to_uppercase());
    Ok(std::env::var(env_name).unwrap_or_else(|_| format!("test-{name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_config_loads_off_spin() {
        let config = gateway().unwrap();
        assert!(!config.key_id.is_empty());
        assert!(!config.base_url.is_empty());
    }

    #[test]
    fn test_courier_config_loads_off_spin() {
        let config = courier().unwrap();
        assert!(!config.email.is_empty());
    }
}
