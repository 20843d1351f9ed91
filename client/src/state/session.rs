//! Question/answer session state.
//!
//! DESIGN
//! ======
//! `SessionState` is an immutable record moved through `reduce`. The phase
//! enum makes "loading" and "error" mutually exclusive, and the loading phase
//! remembers the question so a success can be logged against it. Nothing here
//! outlives the process.
//!
//! `Session` pairs a state with an [`AskApi`]. `submit` takes `&mut self`, so
//! a second exchange cannot start while one is in flight, and the reducer
//! refuses `Submit` during `Loading` for callers that drive it by hand.

use contract::{AskRequest, AskResponse, normalize_question};

use crate::net::{AskApi, ClientError};

/// Shown when a failure carries no backend-provided message.
pub const FALLBACK_ERROR_MESSAGE: &str = "サーバーとの通信に失敗しました。";

/// One completed exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct QaEntry {
    pub question: String,
    pub response: AskResponse,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// One exchange is outstanding for this (normalized) question.
    Loading { question: String },
    /// The last exchange failed; holds the user-facing message.
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Raw user input; normalized before it is accepted.
    Submit(String),
    Succeeded(AskResponse),
    /// User-facing failure message, see [`user_message`].
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    entries: Vec<QaEntry>,
    phase: Phase,
}

impl SessionState {
    /// Completed exchanges, newest first.
    #[must_use]
    pub fn entries(&self) -> &[QaEntry] {
        &self.entries
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Apply one action. Actions that do not fit the current phase leave the
    /// state unchanged.
    #[must_use]
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::Submit(raw) => {
                if self.is_loading() {
                    return self;
                }
                if let Some(question) = normalize_question(&raw) {
                    self.phase = Phase::Loading { question };
                }
            }
            Action::Succeeded(response) => match self.phase {
                Phase::Loading { question } => {
                    self.entries.insert(0, QaEntry { question, response });
                    self.phase = Phase::Idle;
                }
                other => self.phase = other,
            },
            Action::Failed(message) => {
                if self.is_loading() {
                    self.phase = Phase::Error(message);
                }
            }
        }
        self
    }
}

/// Message to show for a failed exchange: the backend's own text when the
/// error is typed, the generic fallback otherwise.
#[must_use]
pub fn user_message(err: &ClientError) -> String {
    match err.api_error() {
        Some((_, body)) => body.error.clone(),
        None => FALLBACK_ERROR_MESSAGE.to_owned(),
    }
}

// =============================================================================
// DRIVER
// =============================================================================

/// What a call to [`Session::submit`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty or too long, or an exchange was already in flight.
    Rejected,
    Answered,
    Failed,
}

impl SubmitOutcome {
    #[must_use]
    pub fn made_request(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

pub struct Session<A> {
    api: A,
    template: AskRequest,
    state: SessionState,
}

impl<A: AskApi> Session<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self::with_template(api, AskRequest::default())
    }

    /// Every question is sent with `template`'s scoping fields.
    #[must_use]
    pub fn with_template(api: A, template: AskRequest) -> Self {
        Self { api, template, state: SessionState::default() }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Start an exchange. Returns the request to send, or `None` when the
    /// input is rejected or an exchange is already in flight.
    pub fn begin(&mut self, raw: &str) -> Option<AskRequest> {
        if self.state.is_loading() {
            return None;
        }
        self.dispatch(Action::Submit(raw.to_owned()));
        match self.state.phase() {
            Phase::Loading { question } => Some(self.template.for_question(question.clone())),
            _ => None,
        }
    }

    /// Resolve the in-flight exchange.
    pub fn finish(&mut self, result: Result<AskResponse, ClientError>) {
        match result {
            Ok(response) => self.dispatch(Action::Succeeded(response)),
            Err(err) => {
                tracing::warn!(error = %err, typed = err.is_typed(), "ask failed");
                self.dispatch(Action::Failed(user_message(&err)));
            }
        }
    }

    /// Run one full exchange: validate, call the API once, record the result.
    pub async fn submit(&mut self, raw: &str) -> SubmitOutcome {
        let Some(request) = self.begin(raw) else {
            return SubmitOutcome::Rejected;
        };
        let result = self.api.ask(&request).await;
        let outcome = if result.is_ok() { SubmitOutcome::Answered } else { SubmitOutcome::Failed };
        self.finish(result);
        outcome
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
