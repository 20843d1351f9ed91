//! Ask API client.
//!
//! DESIGN
//! ======
//! One call, one `POST {base}/api/ask`. No retries, no caching, no
//! deduplication of identical in-flight questions. Response handling lives in
//! the pure `parse_reply` so status/body classification is testable without
//! a server.
//!
//! TIMEOUTS
//! ========
//! `ask_question` waits as long as the transport does. Callers that need a
//! bound use `ask_question_with_deadline`, or configure one on the client so
//! [`AskApi::ask`] applies it.

use std::time::Duration;

use contract::{AskRequest, AskResponse, ErrorResponse, ScoreAnomaly};

use super::error::ClientError;

pub const ASK_PATH: &str = "/api/ask";
pub const HEALTH_PATH: &str = "/healthz";

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Anything that can answer an [`AskRequest`]. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AskApi: Send + Sync {
    /// Submit one question.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`]; only [`ClientError::Api`] carries a
    /// structured backend body.
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ClientError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    deadline: Option<Duration>,
}

impl ApiClient {
    /// Build a client for the gateway at `base_url` (e.g. `http://127.0.0.1:3000`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::HttpClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim().trim_end_matches('/').to_owned(), deadline: None })
    }

    /// Apply `deadline` to every [`AskApi::ask`] call. `None` waits forever.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Issue one ask call and classify the reply.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] for a non-2xx reply with an `ErrorResponse` body
    /// - [`ClientError::Parse`] for a body that matches neither shape
    /// - [`ClientError::Transport`] when no response is obtained
    pub async fn ask_question(&self, request: &AskRequest) -> Result<AskResponse, ClientError> {
        let url = endpoint(&self.base_url, ASK_PATH);
        tracing::debug!(%url, question_chars = request.question_ja.chars().count(), "ask request");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        tracing::debug!(status, bytes = text.len(), "ask response");
        parse_reply(status, &text)
    }

    /// [`Self::ask_question`] bounded by `deadline`.
    ///
    /// # Errors
    ///
    /// As [`Self::ask_question`], plus [`ClientError::DeadlineElapsed`] when
    /// no reply arrives in time. The in-flight request is dropped.
    pub async fn ask_question_with_deadline(
        &self,
        request: &AskRequest,
        deadline: Duration,
    ) -> Result<AskResponse, ClientError> {
        tokio::time::timeout(deadline, self.ask_question(request))
            .await
            .map_err(|_| ClientError::DeadlineElapsed(deadline))?
    }

    /// Probe the gateway's health endpoint and return the HTTP status.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the gateway cannot be reached.
    pub async fn ping(&self) -> Result<u16, ClientError> {
        let response = self
            .http
            .get(endpoint(&self.base_url, HEALTH_PATH))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}

#[async_trait::async_trait]
impl AskApi for ApiClient {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ClientError> {
        match self.deadline {
            Some(deadline) => self.ask_question_with_deadline(request, deadline).await,
            None => self.ask_question(request).await,
        }
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{base_url}{path}")
}

/// Classify a reply by status: 2xx parses as [`AskResponse`], anything else
/// as [`ErrorResponse`].
fn parse_reply(status: u16, body: &str) -> Result<AskResponse, ClientError> {
    if !(200..300).contains(&status) {
        let body: ErrorResponse = serde_json::from_str(body)
            .map_err(|e| ClientError::Parse(format!("status {status}: {e}")))?;
        return Err(ClientError::Api { status, body });
    }

    let response: AskResponse = serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))?;
    for anomaly in response.out_of_range_scores() {
        match anomaly {
            ScoreAnomaly::Confidence(value) => {
                tracing::warn!(confidence = value, "answer confidence outside [0, 1]");
            }
            ScoreAnomaly::CitationScore { index, score } => {
                tracing::warn!(index, score, "citation score outside [0, 1]");
            }
        }
    }
    Ok(response)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
