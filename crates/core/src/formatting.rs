use crate::models::{MergedPassage, ToolResult};

pub const HEADLINE_DELIMITER: &str = " - ";
pub const PAGE_ANCHOR: &str = "#page=";

/// Splits a section heading into `(headline, subhead)`.
///
/// Trailing periods are dropped first. With a delimiter present, the last
/// segment is the subhead and the rest is re-joined as the headline.
pub fn headline_pieces(heading: &str) -> (String, Option<String>) {
    let text = heading.trim_end_matches('.');
    let parts: Vec<&str> = text.split(HEADLINE_DELIMITER).collect();
    match parts.split_last() {
        Some((subhead, head)) if !head.is_empty() => {
            (head.join(HEADLINE_DELIMITER), Some((*subhead).to_string()))
        }
        _ => (text.to_string(), None),
    }
}

pub fn display_url(base_url: &str, starting_page: Option<u32>) -> String {
    match starting_page {
        Some(page) => format!("{base_url}{PAGE_ANCHOR}{page}"),
        None => base_url.to_string(),
    }
}

impl MergedPassage {
    pub fn headline(&self) -> String {
        headline_pieces(&self.metadata.corpus_subsection).0
    }

    pub fn subhead(&self) -> Option<String> {
        headline_pieces(&self.metadata.corpus_subsection).1
    }

    pub fn url(&self) -> String {
        display_url(
            &self.metadata.source_url,
            self.metadata.starting_page_number,
        )
    }
}

pub fn to_tool_result(passage: &MergedPassage) -> ToolResult {
    let (headline, subhead) = headline_pieces(&passage.metadata.corpus_subsection);
    let url = passage.url();

    ToolResult {
        text: passage.content.clone(),
        title: subhead.clone().unwrap_or_else(|| headline.clone()),
        pdf_url: url.clone(),
        url,
        excerpt_headline: headline,
        excerpt_subhead: subhead,
        excerpt: passage.metadata.corpus_text.clone(),
        concerns: passage.metadata.concerns.clone(),
    }
}

pub fn to_tool_results(passages: &[MergedPassage]) -> Vec<ToolResult> {
    passages.iter().map(to_tool_result).collect()
}
