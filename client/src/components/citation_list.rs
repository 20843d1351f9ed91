//! Citation list renderer.

use std::fmt;

use contract::Citation;

pub const SOURCE_LINK_LABEL: &str = "Source";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLink {
    pub href: String,
    pub label: &'static str,
}

/// One rendered citation. Optional parts are `None` when the source field
/// is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CitationItem {
    pub rule_tag: Option<String>,
    pub section_title: Option<String>,
    /// Score formatted to two decimals, e.g. `score: 0.90`.
    pub score: String,
    pub quote: Option<String>,
    pub source: Option<SourceLink>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CitationSection {
    /// `引用 (N)` where N is the citation count.
    pub heading: String,
    pub items: Vec<CitationItem>,
}

/// Render citations in list order. An empty list renders nothing at all.
#[must_use]
pub fn render_citations(citations: &[Citation]) -> Option<CitationSection> {
    if citations.is_empty() {
        return None;
    }
    Some(CitationSection {
        heading: format!("引用 ({})", citations.len()),
        items: citations.iter().map(render_item).collect(),
    })
}

fn render_item(citation: &Citation) -> CitationItem {
    CitationItem {
        rule_tag: non_empty(&citation.rule_id),
        section_title: non_empty(&citation.section_title),
        score: format!("score: {:.2}", citation.score),
        quote: non_empty(&citation.quote_en),
        source: non_empty(&citation.source_url).map(|href| SourceLink { href, label: SOURCE_LINK_LABEL }),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

impl fmt::Display for CitationSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        for item in &self.items {
            write!(f, "  -")?;
            if let Some(tag) = &item.rule_tag {
                write!(f, " [{tag}]")?;
            }
            if let Some(title) = &item.section_title {
                write!(f, " {title}")?;
            }
            writeln!(f, " ({})", item.score)?;
            if let Some(quote) = &item.quote {
                writeln!(f, "    \u{201c}{quote}\u{201d}")?;
            }
            if let Some(link) = &item.source {
                writeln!(f, "    {}: {}", link.label, link.href)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "citation_list_test.rs"]
mod tests;
