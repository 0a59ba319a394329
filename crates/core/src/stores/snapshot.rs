use crate::traits::PassageRetriever;
use crate::{RetrievalError, RetrievedPassage};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Replays retriever output previously saved as a JSON array.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    passages: Vec<RetrievedPassage>,
}

impl SnapshotStore {
    pub fn new(passages: Vec<RetrievedPassage>) -> Self {
        Self { passages }
    }

    pub async fn load(path: &Path) -> Result<Self, RetrievalError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let passages: Vec<RetrievedPassage> = serde_json::from_str(&raw)?;
        info!(path = %path.display(), passages = passages.len(), "loaded retrieval snapshot");
        Ok(Self::new(passages))
    }

    pub fn passages(&self) -> &[RetrievedPassage] {
        &self.passages
    }
}

#[async_trait]
impl PassageRetriever for SnapshotStore {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn search(
        &self,
        _query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        let limit = if top_k == 0 { self.passages.len() } else { top_k };
        Ok(self.passages.iter().take(limit).cloned().collect())
    }
}
