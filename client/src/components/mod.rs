//! Display models for the Q&A page.
//!
//! Each renderer is a pure function from session data to a plain struct; the
//! `Display` impls give the terminal rendering used by `rulegate-cli`.

pub mod answer_card;
pub mod citation_list;
pub mod page;

pub use answer_card::{AnswerCard, render_answer};
pub use citation_list::{CitationItem, CitationSection, SourceLink, render_citations};
pub use page::{Page, render_page};
