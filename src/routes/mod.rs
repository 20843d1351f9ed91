//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway exposes a single ask endpoint that relays to the RAG backend,
//! plus a health probe. Every request gets an `X-Request-Id`; only the ask
//! route sits behind the per-client rate limiter.

pub mod ask;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::Router;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use contract::ErrorResponse;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AllowedOrigin;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// User-facing text for a request rejected by the rate limiter.
pub const RATE_LIMITED_MESSAGE: &str = "リクエストが多すぎます。しばらくしてから再度お試しください。";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id for one inbound request, stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Full gateway router: ask relay, health probe, CORS, tracing, request ids.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allow_origin);

    let ask_routes = Router::new()
        .route("/api/ask", post(ask::relay_ask))
        .route_layer(middleware::from_fn_with_state(state.clone(), enforce_rate_limit));

    Router::new()
        .merge(ask_routes)
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn(assign_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &AllowedOrigin) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([REQUEST_ID_HEADER]);
    match origin {
        AllowedOrigin::Any => layer.allow_origin(Any),
        AllowedOrigin::Exact(value) => layer.allow_origin(value.clone()),
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Reuse a caller-supplied `X-Request-Id` or mint a UUID, expose it to
/// handlers, and echo it on the response.
async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_owned);

    request.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn enforce_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_ip(request.headers(), peer);

    if let Err(err) = state.rate_limiter.check_and_record(client) {
        tracing::warn!(%client, error = %err, "ask request rate limited");
        let body = ErrorResponse::new(RATE_LIMITED_MESSAGE)
            .with_code("RATE_LIMITED")
            .with_details(err.to_string());
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    next.run(request).await
}

/// First `X-Forwarded-For` entry when it parses, else the peer address.
pub(crate) fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> IpAddr {
    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
        .or(peer)
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
