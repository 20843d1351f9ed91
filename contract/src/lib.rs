//! Shared ask contract for the rules Q&A flow.
//!
//! This crate owns the JSON shapes exchanged between `client`, the gateway,
//! and the RAG backend. The gateway never parses relayed bodies with these
//! types; it only uses [`ErrorResponse`] for failures it originates itself.
//!
//! Optional request fields are omitted from the wire when unset so that the
//! backend applies its own defaults.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Maximum question length, counted in Unicode scalar values after trimming.
pub const MAX_QUESTION_CHARS: usize = 1000;

// =============================================================================
// REQUEST
// =============================================================================

/// Body of `POST /api/ask`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    /// The user's question, in Japanese.
    pub question_ja: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discipline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<QueryContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RequestOptions>,
}

impl AskRequest {
    /// Build a request carrying only the question; every scoping field is left
    /// to the backend default.
    #[must_use]
    pub fn new(question_ja: impl Into<String>) -> Self {
        Self { question_ja: question_ja.into(), ..Self::default() }
    }

    /// Copy this request's scoping fields onto a new question.
    #[must_use]
    pub fn for_question(&self, question_ja: impl Into<String>) -> Self {
        Self { question_ja: question_ja.into(), ..self.clone() }
    }
}

/// Free-text situational hints that narrow the question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boat_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Retrieval and generation knobs. Absent values mean "backend default".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Number of retrieval candidates; zero is not representable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<NonZeroU32>,
    /// Retrieval score below which the backend answers "not found". In `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_contexts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_style: Option<String>,
}

impl RequestOptions {
    /// `true` when no option is set, so the whole object can be left off the wire.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top_k.is_none()
            && self.min_confidence.is_none()
            && self.return_contexts.is_none()
            && self.answer_style.is_none()
    }
}

/// Trim a raw question and enforce the length bound.
///
/// Returns `None` for empty, whitespace-only, or over-long input. No other
/// sanitization is applied.
#[must_use]
pub fn normalize_question(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_QUESTION_CHARS {
        return None;
    }
    Some(trimmed.to_owned())
}

// =============================================================================
// RESPONSE
// =============================================================================

/// A supporting excerpt returned alongside an answer.
///
/// Text fields may be empty; missing fields decode as empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub rule_id: String,
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub quote_en: String,
    #[serde(default)]
    pub source_url: String,
    /// Relevance of this citation alone, conventionally in `[0, 1]`.
    pub score: f64,
}

/// Retrieval metadata reported by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Name of the corpus that was searched, e.g. `"icf-2024"`.
    pub rag_corpus: String,
    /// Number of candidates actually considered.
    pub top_k: u32,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Successful body of `POST /api/ask`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer_ja: String,
    /// Overall answer confidence, conventionally in `[0, 1]`.
    pub confidence: f64,
    /// Citations in relevance order.
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub meta: Meta,
}

/// Whether a response carries an answer or the "not found" sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Found,
    /// Zero confidence and no citations.
    NotFound,
}

/// A score that lies outside `[0, 1]` (or is NaN).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreAnomaly {
    Confidence(f64),
    CitationScore { index: usize, score: f64 },
}

impl AskResponse {
    /// Classify the response. `NotFound` is exactly `confidence == 0` with an
    /// empty citation list; every other combination is a normal answer.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn outcome(&self) -> Outcome {
        if self.confidence == 0.0 && self.citations.is_empty() {
            Outcome::NotFound
        } else {
            Outcome::Found
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.outcome() == Outcome::NotFound
    }

    /// List every score outside `[0, 1]`. Values are reported, never clamped.
    #[must_use]
    pub fn out_of_range_scores(&self) -> Vec<ScoreAnomaly> {
        let mut anomalies = Vec::new();
        if !in_unit_range(self.confidence) {
            anomalies.push(ScoreAnomaly::Confidence(self.confidence));
        }
        for (index, citation) in self.citations.iter().enumerate() {
            if !in_unit_range(citation.score) {
                anomalies.push(ScoreAnomaly::CitationScore { index, score: citation.score });
            }
        }
        anomalies
    }
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

// =============================================================================
// ERROR
// =============================================================================

/// Body of every non-2xx response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message, shown to the user verbatim.
    pub error: String,
    /// Machine-readable identifier, e.g. `"NOT_FOUND"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), code: None, details: None }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
