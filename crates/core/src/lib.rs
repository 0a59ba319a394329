pub mod consolidator;
pub mod error;
pub mod formatting;
pub mod models;
pub mod stores;
pub mod tool;
pub mod traits;

pub use consolidator::{
    amplified_score, consolidate, match_amplification_factor, merge_group, merge_results,
    rerank_after_merge,
};
pub use error::RetrievalError;
pub use formatting::{display_url, headline_pieces, to_tool_result, to_tool_results};
pub use models::{
    ConsolidationOptions, MergedPassage, PassageMetadata, RankOrder, RetrievedPassage, ToolResult,
    MATCH_AMPLIFICATION_ALPHA,
};
pub use stores::{HttpRetrieverStore, SnapshotStore};
pub use tool::RetrievalTool;
pub use traits::PassageRetriever;
