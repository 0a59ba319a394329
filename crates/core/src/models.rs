use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use std::collections::BTreeMap;

pub const MATCH_AMPLIFICATION_ALPHA: f64 = 0.5;

/// Descriptive fields the indexer stored alongside each passage.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PassageMetadata {
    pub corpus_order: i64,
    #[serde(default)]
    pub corpus_section: String,
    #[serde(default)]
    pub corpus_section_order: i64,
    #[serde(default)]
    pub corpus_subsection: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub element_ids: Vec<String>,
    #[serde(default)]
    pub corpus_text: String,
    #[serde(default)]
    pub analysis: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub starting_page_number: Option<u32>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub page_numbers: Vec<u32>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub printed_page_numbers: Vec<String>,
    #[serde(default)]
    pub source_url: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub contributors: Vec<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub acronyms: BTreeMap<String, String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub named_entities: Vec<String>,
}

/// A single hit as returned by the passage retriever.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedPassage {
    pub content: String,
    pub score: f64,
    pub rank: usize,
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub passage_id: u64,
    #[serde(rename = "document_metadata")]
    pub metadata: PassageMetadata,
}

impl RetrievedPassage {
    /// Grouping key: passages sharing it come from the same source section.
    pub fn section_order(&self) -> i64 {
        self.metadata.corpus_order
    }
}

/// One record per source section after same-section hits were folded together.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedPassage {
    pub content: String,
    pub score: f64,
    pub rank: usize,
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub passage_id: u64,
    #[serde(rename = "document_metadata")]
    pub metadata: PassageMetadata,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub merged_scores: Vec<f64>,
}

impl MergedPassage {
    pub fn section_order(&self) -> i64 {
        self.metadata.corpus_order
    }

    /// Scores to feed into rescoring. A record that never went through a merge
    /// counts as a single match on its own score.
    pub fn effective_scores(&self) -> Vec<f64> {
        if self.merged_scores.is_empty() {
            vec![self.score]
        } else {
            self.merged_scores.clone()
        }
    }

    pub fn match_count(&self) -> usize {
        self.merged_scores.len().max(1)
    }

    /// Drops `merged_scores`, turning the record back into retriever input.
    pub fn into_retrieved(self) -> RetrievedPassage {
        RetrievedPassage {
            content: self.content,
            score: self.score,
            rank: self.rank,
            document_id: self.document_id,
            passage_id: self.passage_id,
            metadata: self.metadata,
        }
    }
}

impl From<RetrievedPassage> for MergedPassage {
    fn from(value: RetrievedPassage) -> Self {
        Self {
            merged_scores: vec![value.score],
            content: value.content,
            score: value.score,
            rank: value.rank,
            document_id: value.document_id,
            passage_id: value.passage_id,
            metadata: value.metadata,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    /// Lowest rescored passage gets rank 1.
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsolidationOptions {
    pub alpha: f64,
    pub order: RankOrder,
    pub top_k: usize,
}

impl Default for ConsolidationOptions {
    fn default() -> Self {
        Self {
            alpha: MATCH_AMPLIFICATION_ALPHA,
            order: RankOrder::Ascending,
            top_k: 10,
        }
    }
}

/// Caller-facing view of a consolidated passage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub text: String,
    pub title: String,
    pub url: String,
    pub pdf_url: String,
    pub excerpt_headline: String,
    pub excerpt_subhead: Option<String>,
    pub excerpt: String,
    pub concerns: Vec<String>,
}
