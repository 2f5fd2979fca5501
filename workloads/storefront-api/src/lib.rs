//! Storefront and back-office JSON API.
//!
//! A single Spin HTTP component serving `/api/...`: catalog reads, account
//! and session management, cart mutations, checkout, hosted-checkout
//! payment verification, shipment tracking, contact intake, and the staff
//! back office. Domain logic lives in the `weft-*` crates; this workload
//! owns routing, rate limiting, sessions, and the JSON envelope.

mod config;
mod handlers;
mod http;
mod identity;
mod logging;
mod migrate;
mod router;

#[cfg(target_arch = "wasm32")]
mod component {
    use spin_sdk::http::{IntoResponse, Request};
    use spin_sdk::http_component;

    #[http_component]
    async fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
        Ok(crate::router::dispatch(req).await)
    }
}
