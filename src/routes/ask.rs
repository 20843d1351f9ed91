//! Ask relay.
//!
//! DESIGN
//! ======
//! `POST /api/ask` is forwarded to `{API_URL}/api/ask` exactly once, with the
//! inbound body untouched. Whatever status and body the backend answers with
//! are handed back as-is; only the content type is pinned to JSON. The
//! gateway never parses either side.
//!
//! ERROR HANDLING
//! ==============
//! A backend that cannot be reached (or whose body cannot be read) becomes a
//! 502 with a structured `ErrorResponse`. The `error` text is shown to the
//! end user verbatim, so it is Japanese. The backend URL is stripped from the
//! error before it is rendered into `details`.

use std::time::Instant;

use axum::Extension;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use contract::ErrorResponse;

use super::{REQUEST_ID_HEADER, RequestId};
use crate::state::AppState;

/// User-facing text for a backend that cannot be reached.
pub const BACKEND_UNAVAILABLE_MESSAGE: &str = "サーバーとの通信に失敗しました。";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("backend request failed: {0}")]
    Unreachable(reqwest::Error),
    #[error("backend response could not be read: {0}")]
    BodyRead(reqwest::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (Self::Unreachable(source) | Self::BodyRead(source)) = self;
        let body = ErrorResponse::new(BACKEND_UNAVAILABLE_MESSAGE)
            .with_code("BACKEND_UNAVAILABLE")
            .with_details(source.without_url().to_string());
        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}

/// Forward one ask request to the backend and relay its reply verbatim.
///
/// # Errors
///
/// Returns [`GatewayError`] when the backend is unreachable or its response
/// body cannot be read.
pub async fn relay_ask(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let started = Instant::now();
    let request_bytes = body.len();

    let upstream = state
        .http
        .post(state.config.ask_url())
        .header(header::CONTENT_TYPE, "application/json")
        .header(REQUEST_ID_HEADER, request_id.as_str())
        .body(body)
        .send()
        .await
        .inspect_err(|e| tracing::error!(%request_id, error = %e, "backend unreachable"))
        .map_err(GatewayError::Unreachable)?;

    let status = upstream.status();
    let payload = upstream
        .bytes()
        .await
        .inspect_err(|e| tracing::error!(%request_id, %status, error = %e, "backend body read failed"))
        .map_err(GatewayError::BodyRead)?;

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        %request_id,
        status = status.as_u16(),
        request_bytes,
        response_bytes = payload.len(),
        elapsed_ms,
        "ask relayed"
    );

    Ok(json_response(status, payload))
}

/// Wrap relayed bytes with the given status and a JSON content type.
pub(crate) fn json_response(status: StatusCode, payload: Bytes) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        Body::from(payload),
    )
        .into_response()
}

#[cfg(test)]
#[path = "ask_test.rs"]
mod tests;
