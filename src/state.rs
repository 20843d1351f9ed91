//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! relay itself is stateless; the only shared pieces are the pooled HTTP
//! client used for backend calls and the per-client rate limiter.

use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::rate_limit::RateLimiter;

const BACKEND_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub http: reqwest::Client,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Build state from parsed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        // Only the connect phase is bounded; a slow generation is relayed as-is.
        // The backend is an internal hop, so system proxies are bypassed.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(BACKEND_CONNECT_TIMEOUT_SECS))
            .no_proxy()
            .build()?;
        let rate_limiter = RateLimiter::new(config.rate_limit);
        Ok(Self { config: Arc::new(config), http, rate_limiter })
    }
}
