//! Source gateway implementations for PriceOwl.
//!
//! One client per upstream service, each implementing the matching trait
//! from `priceowl_core::store`. All clients share the same boundary rule:
//! internal request helpers return `Result<_, StoreError>`, the public
//! trait methods catch, log via `tracing`, and return empty collections —
//! no upstream failure ever crosses into the agent as an error.
//!
//! Each client owns exactly one `reqwest::Client`, built once with a
//! request-level timeout so a hung upstream cannot stall the scheduler.

pub mod cheapshark;
pub mod gog;
pub mod humble;
pub mod steam;

mod de;

pub use cheapshark::CheapSharkClient;
pub use gog::GogClient;
pub use humble::HumbleClient;
pub use steam::SteamClient;

use priceowl_core::error::StoreError;

/// Map a transport error to our taxonomy.
fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout(e.to_string())
    } else {
        StoreError::Network(e.to_string())
    }
}

/// Reject non-2xx responses before parsing.
fn check_status(resp: &reqwest::Response) -> Result<(), StoreError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(StoreError::ApiError {
            status_code: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        })
    }
}

/// Build the shared HTTP client for a gateway.
fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(concat!("priceowl/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
}
