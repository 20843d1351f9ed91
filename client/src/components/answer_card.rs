//! Answer card renderer.
//!
//! The not-found decision comes from [`AskResponse::outcome`]; this module
//! only reacts to it by dropping the citation section. Answer text, badge and
//! corpus label are always shown.
//!
//! [`AskResponse::outcome`]: contract::AskResponse::outcome

use std::fmt;

use contract::Outcome;

use super::citation_list::{CitationSection, render_citations};
use crate::state::QaEntry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerCard {
    /// The question as submitted.
    pub title: String,
    pub answer: String,
    /// `confidence: 0.82`
    pub confidence_badge: String,
    /// `corpus: icf-2024`
    pub corpus_label: String,
    pub outcome: Outcome,
    /// Present only for [`Outcome::Found`] responses with citations.
    pub citations: Option<CitationSection>,
    pub warnings: Vec<String>,
}

#[must_use]
pub fn render_answer(entry: &QaEntry) -> AnswerCard {
    let response = &entry.response;
    let outcome = response.outcome();
    let citations = match outcome {
        Outcome::Found => render_citations(&response.citations),
        Outcome::NotFound => None,
    };
    AnswerCard {
        title: entry.question.clone(),
        answer: response.answer_ja.clone(),
        confidence_badge: format!("confidence: {:.2}", response.confidence),
        corpus_label: format!("corpus: {}", response.meta.rag_corpus),
        outcome,
        citations,
        warnings: response.meta.warnings.clone(),
    }
}

impl fmt::Display for AnswerCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Q: {}", self.title)?;
        if !self.answer.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.answer)?;
        }
        if let Some(citations) = &self.citations {
            writeln!(f)?;
            write!(f, "{citations}")?;
        }
        for warning in &self.warnings {
            writeln!(f, "! {warning}")?;
        }
        writeln!(f)?;
        writeln!(f, "[{}]  {}", self.confidence_badge, self.corpus_label)
    }
}

#[cfg(test)]
#[path = "answer_card_test.rs"]
mod tests;
