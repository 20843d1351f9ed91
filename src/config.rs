//! Gateway configuration parsed from environment variables.

use axum::http::HeaderValue;

use crate::rate_limit::RateLimitConfig;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable is set but cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which browser origins may call the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigin {
    Any,
    Exact(HeaderValue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL of the RAG backend, without trailing slash.
    pub backend_url: String,
    pub port: u16,
    pub allow_origin: AllowedOrigin,
    pub rate_limit: RateLimitConfig,
}

impl GatewayConfig {
    /// Build typed gateway config from environment variables.
    ///
    /// Optional:
    /// - `API_URL`: backend base URL, default `http://localhost:8080`
    /// - `PORT`: listen port, default 3000
    /// - `ALLOW_ORIGIN`: CORS origin, default `*`
    /// - `RATE_LIMIT_PER_CLIENT`, `RATE_LIMIT_PER_CLIENT_WINDOW_SECS`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unparsable port or origin.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url = std::env::var("API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value: raw })?,
            Err(_) => DEFAULT_PORT,
        };

        let allow_origin = parse_allow_origin(std::env::var("ALLOW_ORIGIN").ok().as_deref())?;

        Ok(Self { backend_url, port, allow_origin, rate_limit: RateLimitConfig::from_env() })
    }

    /// Full URL of the backend ask endpoint.
    #[must_use]
    pub fn ask_url(&self) -> String {
        format!("{}/api/ask", self.backend_url)
    }
}

fn parse_allow_origin(raw: Option<&str>) -> Result<AllowedOrigin, ConfigError> {
    match raw.map(str::trim) {
        None | Some("" | "*") => Ok(AllowedOrigin::Any),
        Some(origin) => HeaderValue::from_str(origin)
            .map(AllowedOrigin::Exact)
            .map_err(|_| ConfigError::InvalidValue { key: "ALLOW_ORIGIN", value: origin.to_owned() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
