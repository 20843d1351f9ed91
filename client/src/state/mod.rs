//! Client-side session state.

pub mod session;

pub use session::{Action, FALLBACK_ERROR_MESSAGE, Phase, QaEntry, Session, SessionState, SubmitOutcome, user_message};
