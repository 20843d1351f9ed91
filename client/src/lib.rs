//! Rules Q&A client.
//!
//! `net` talks to the gateway, `state` holds the per-session question log and
//! its reducer, and `components` turns that state into display models.

pub mod components;
pub mod net;
pub mod state;
