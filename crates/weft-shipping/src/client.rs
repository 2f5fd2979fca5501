//! Courier API client with cached bearer-token auth.

use crate::config::CourierConfig;
use crate::error::ShippingError;
use crate::timeline::{TrackingData, TrackingEvent};
use serde::{Deserialize, Serialize};
use weft_cache::{cache_key, Cache};
use weft_data::FetchClient;

/// Courier tokens stay valid for ten days; refresh after nine so a cached
/// token is never presented close to its server-side expiry.
const TOKEN_TTL_SECS: i64 = 9 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

#[derive(Debug, Serialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Client for the logistics API.
pub struct CourierClient {
    config: CourierConfig,
    http: FetchClient,
    cache: Cache,
}

impl CourierClient {
    /// Build a client from validated config.
    pub fn new(config: CourierConfig) -> Result<Self, ShippingError> {
        let http = FetchClient::new().with_base_url(config.base_url.clone());
        let cache = Cache::open_default()?;
        Ok(Self {
            config,
            http,
            cache,
        })
    }

    /// Fetch live tracking for an AWB code.
    ///
    /// Callers are expected to fall back to a synthesized timeline on any
    /// error here; this method itself reports failures faithfully.
    pub async fn track(&self, awb: &str) -> Result<TrackingData, ShippingError> {
        let token = self.token().await?;
        let response = self
            .http
            .get(format!("/courier/track/awb/{}", awb))
            .bearer_auth(&token)
            .send()
            .await?
            .error_for_status()?;

        let parsed: CourierTrackingResponse = response.json()?;
        parsed.into_tracking(awb)
    }

    /// Return a valid bearer token, logging in when the cached one is
    /// absent or past expiry.
    async fn token(&self) -> Result<String, ShippingError> {
        let key = cache_key!("courier", "token");
        if let Some(cached) = self.cache.get::<CachedToken>(&key)? {
            if cached.expires_at > current_timestamp() {
                return Ok(cached.token);
            }
        }
        self.login().await
    }

    async fn login(&self) -> Result<String, ShippingError> {
        let request = LoginRequest {
            email: self.config.email.clone(),
            password: self.config.password.clone(),
        };
        let response = self.http.post("/auth/login").json(&request)?.send().await?;
        if !response.is_success() {
            return Err(ShippingError::AuthFailed(response.status));
        }
        let auth: LoginResponse = response.json()?;

        // Tracking still works if the cache write fails; the next call
        // just logs in again.
        let cached = CachedToken {
            token: auth.token.clone(),
            expires_at: current_timestamp() + TOKEN_TTL_SECS,
        };
        let _ = self.cache.set(&cache_key!("courier", "token"), &cached);

        Ok(auth.token)
    }
}

#[derive(Debug, Deserialize)]
struct CourierTrackingResponse {
    tracking_data: CourierTrackingData,
}

#[derive(Debug, Deserialize)]
struct CourierTrackingData {
    #[serde(default)]
    shipment_status: String,
    #[serde(default)]
    shipment_track: Vec<CourierShipment>,
}

#[derive(Debug, Deserialize)]
struct CourierShipment {
    #[serde(default)]
    current_status: String,
    #[serde(default)]
    courier_name: String,
    #[serde(default)]
    edd: String,
    #[serde(default)]
    shipment_track_activities: Vec<CourierActivity>,
}

#[derive(Debug, Deserialize)]
struct CourierActivity {
    #[serde(default)]
    date: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    activity: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    sr_status_label: String,
}

impl CourierTrackingResponse {
    fn into_tracking(self, awb: &str) -> Result<TrackingData, ShippingError> {
        let Some(shipment) = self.tracking_data.shipment_track.into_iter().next() else {
            // The courier answered but has nothing for this AWB yet.
            // Reported as an error so the caller synthesizes a timeline.
            return Err(ShippingError::CourierError(format!(
                "no tracking data for AWB {}",
                awb
            )));
        };

        let current_status = if shipment.current_status.is_empty() {
            self.tracking_data.shipment_status
        } else {
            shipment.current_status
        };

        Ok(TrackingData {
            tracking_number: Some(awb.to_string()),
            current_status,
            courier_name: non_empty(shipment.courier_name),
            estimated_delivery: non_empty(shipment.edd),
            synthesized: false,
            events: shipment
                .shipment_track_activities
                .into_iter()
                .map(CourierActivity::into_event)
                .collect(),
        })
    }
}

impl CourierActivity {
    fn into_event(self) -> TrackingEvent {
        let status = if self.sr_status_label.is_empty() {
            self.status
        } else {
            self.sr_status_label
        };
        TrackingEvent {
            status,
            description: self.activity,
            location: non_empty(self.location),
            timestamp: None,
            date: non_empty(self.date),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_payload_maps_to_tracking() {
        let body = r#"{
            "tracking_data": {
                "track_status": 1,
                "shipment_status": "In Transit",
                "shipment_track": [{
                    "current_status": "In Transit",
                    "courier_name": "Delhivery Surface",
                    "edd": "2024-01-20",
                    "shipment_track_activities": [
                        {
                            "date": "2024-01-15 10:30:00",
                            "status": "PKD",
                            "activity": "Shipment picked up",
                            "location": "Kochi_Hub",
                            "sr_status_label": "Picked Up"
                        },
                        {
                            "date": "2024-01-16 02:12:00",
                            "status": "IT",
                            "activity": "Shipment in transit",
                            "location": "Bengaluru_Gateway",
                            "sr_status_label": ""
                        }
                    ]
                }]
            }
        }"#;

        let parsed: CourierTrackingResponse = serde_json::from_str(body).unwrap();
        let data = parsed.into_tracking("AWB123456").unwrap();

        assert!(!data.synthesized);
        assert_eq!(data.tracking_number.as_deref(), Some("AWB123456"));
        assert_eq!(data.courier_name.as_deref(), Some("Delhivery Surface"));
        assert_eq!(data.events.len(), 2);
        assert_eq!(data.events[0].status, "Picked Up");
        assert_eq!(data.events[1].status, "IT");
        assert_eq!(data.events[1].location.as_deref(), Some("Bengaluru_Gateway"));
    }

    #[test]
    fn test_empty_shipment_track_is_an_error() {
        let body = r#"{"tracking_data": {"track_status": 0, "shipment_track": []}}"#;
        let parsed: CourierTrackingResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            parsed.into_tracking("AWB123456"),
            Err(ShippingError::CourierError(_))
        ));
    }

    #[test]
    fn test_login_request_wire_shape() {
        let request = LoginRequest {
            email: "ship@example.com".to_string(),
            password: "secret".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["email"], "ship@example.com");
        assert_eq!(json["password"], "secret");

        let auth: LoginResponse =
            serde_json::from_str(r#"{"token": "eyJhbGciOiJIUzI1NiJ9.abc"}"#).unwrap();
        assert_eq!(auth.token, "eyJhbGciOiJIUzI1NiJ9.abc");
    }
}
