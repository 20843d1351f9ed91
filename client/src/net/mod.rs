//! Network layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! A single HTTP operation, `POST /api/ask`, issued against the gateway.
//! Failures are split into typed API errors (structured body from the
//! backend) and everything else.

pub mod api;
pub mod error;

pub use api::{ASK_PATH, ApiClient, AskApi, HEALTH_PATH};
pub use error::ClientError;
