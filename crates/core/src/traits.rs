use crate::{RetrievalError, RetrievedPassage};
use async_trait::async_trait;

/// Handle to a loaded passage index. Built once and shared read-only.
#[async_trait]
pub trait PassageRetriever {
    /// Backend label used in logs and errors.
    fn name(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, RetrievalError>;
}
