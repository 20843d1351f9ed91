//! In-memory rate limiting for ask requests.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<IpAddr, VecDeque<Instant>>`.
//! One limit is enforced per client IP; a limit of zero disables the check.
//! Rejected requests never reach the backend.
//!
//! TRADE-OFFS
//! ==========
//! Idle clients are swept only once the map grows past `SWEEP_THRESHOLD`,
//! so memory stays bounded by active clients without a background task.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const DEFAULT_PER_CLIENT_LIMIT: usize = 10;
const DEFAULT_PER_CLIENT_WINDOW_SECS: u64 = 1;

const SWEEP_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per client within one window. Zero disables limiting.
    pub per_client_limit: usize,
    pub per_client_window: Duration,
}

impl RateLimitConfig {
    /// Read `RATE_LIMIT_PER_CLIENT` and `RATE_LIMIT_PER_CLIENT_WINDOW_SECS`,
    /// falling back to defaults for absent or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        let window_secs = env_parse("RATE_LIMIT_PER_CLIENT_WINDOW_SECS", DEFAULT_PER_CLIENT_WINDOW_SECS);
        Self {
            per_client_limit: env_parse("RATE_LIMIT_PER_CLIENT", DEFAULT_PER_CLIENT_LIMIT),
            per_client_window: Duration::from_secs(window_secs),
        }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self { per_client_limit: 0, ..Self::default() }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_client_limit: DEFAULT_PER_CLIENT_LIMIT,
            per_client_window: Duration::from_secs(DEFAULT_PER_CLIENT_WINDOW_SECS),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit exceeded (max {limit} requests/{window_secs}s)")]
    PerClientExceeded { limit: usize, window_secs: u64 },
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<IpAddr, VecDeque<Instant>>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), config }
    }

    /// Check the per-client limit, then record the request.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::PerClientExceeded`] when the client already
    /// used its quota for the current window.
    pub fn check_and_record(&self, client: IpAddr) -> Result<(), RateLimitError> {
        self.check_and_record_at(client, Instant::now())
    }

    /// Internal: check + record with explicit timestamp (for testing).
    fn check_and_record_at(&self, client: IpAddr, now: Instant) -> Result<(), RateLimitError> {
        let cfg = self.config;
        if cfg.per_client_limit == 0 {
            return Ok(());
        }

        let mut clients = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if clients.len() > SWEEP_THRESHOLD {
            clients.retain(|_, deque| {
                prune_window(deque, now, cfg.per_client_window);
                !deque.is_empty()
            });
        }

        let deque = clients.entry(client).or_default();
        prune_window(deque, now, cfg.per_client_window);
        if deque.len() >= cfg.per_client_limit {
            return Err(RateLimitError::PerClientExceeded {
                limit: cfg.per_client_limit,
                window_secs: cfg.per_client_window.as_secs(),
            });
        }

        deque.push_back(now);
        Ok(())
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
