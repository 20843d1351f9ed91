//! Whole-page renderer: header, error banner, loading indicator, then one
//! card per entry, newest first.

use std::fmt;

use super::answer_card::{AnswerCard, render_answer};
use crate::state::SessionState;

pub const PAGE_TITLE: &str = "rulegate";
pub const PAGE_SUBTITLE: &str = "ICF カヌースラローム競技規則 Q&A";
pub const LOADING_TEXT: &str = "回答を生成中...";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub error_banner: Option<String>,
    pub loading: Option<&'static str>,
    pub cards: Vec<AnswerCard>,
}

#[must_use]
pub fn render_page(state: &SessionState) -> Page {
    Page {
        title: PAGE_TITLE,
        subtitle: PAGE_SUBTITLE,
        error_banner: state.error().map(str::to_owned),
        loading: state.is_loading().then_some(LOADING_TEXT),
        cards: state.entries().iter().map(render_answer).collect(),
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} | {}", self.title, self.subtitle)?;
        if let Some(error) = &self.error_banner {
            writeln!(f)?;
            writeln!(f, "error: {error}")?;
        }
        if let Some(loading) = self.loading {
            writeln!(f)?;
            writeln!(f, "{loading}")?;
        }
        for card in &self.cards {
            writeln!(f)?;
            writeln!(f, "----")?;
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
