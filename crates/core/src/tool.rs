use crate::consolidator::consolidate;
use crate::formatting::to_tool_results;
use crate::traits::PassageRetriever;
use crate::{ConsolidationOptions, MergedPassage, RetrievalError, ToolResult};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Retrieval tool exposed to the chat backend: search, merge, rerank, format.
pub struct RetrievalTool<R>
where
    R: PassageRetriever,
{
    retriever: Arc<R>,
    options: ConsolidationOptions,
}

impl<R> RetrievalTool<R>
where
    R: PassageRetriever + Send + Sync,
{
    pub fn new(retriever: Arc<R>, options: ConsolidationOptions) -> Self {
        Self { retriever, options }
    }

    pub fn is_available() -> bool {
        true
    }

    pub fn options(&self) -> &ConsolidationOptions {
        &self.options
    }

    /// Runs the pipeline and returns the ranked sections.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<MergedPassage>, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }

        let passages = self.retriever.search(query, self.options.top_k).await?;
        let hit_count = passages.len();
        let consolidated = consolidate(passages, &self.options);

        info!(
            backend = self.retriever.name(),
            hits = hit_count,
            sections = consolidated.len(),
            "consolidated retrieval results"
        );
        Ok(consolidated)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<ToolResult>, RetrievalError> {
        let consolidated = self.retrieve(query).await?;
        Ok(to_tool_results(&consolidated))
    }

    /// Tool-call entry point. `parameters` is a JSON object with a `query` string;
    /// a missing query is treated as empty. Blank queries are rejected with
    /// `EmptyQuery` rather than forwarded to the retriever.
    pub async fn call(&self, parameters: &Value) -> Result<Vec<ToolResult>, RetrievalError> {
        let Some(object) = parameters.as_object() else {
            return Err(RetrievalError::InvalidParameters(
                "expected a JSON object".to_string(),
            ));
        };

        let query = match object.get("query") {
            None | Some(Value::Null) => "",
            Some(Value::String(text)) => text.as_str(),
            Some(other) => {
                return Err(RetrievalError::InvalidParameters(format!(
                    "query must be a string, got {other}"
                )))
            }
        };

        self.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PassageMetadata, RankOrder, RetrievedPassage};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRetriever {
        hits: Vec<RetrievedPassage>,
        requests: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl PassageRetriever for FakeRetriever {
        fn name(&self) -> &str {
            "fake"
        }

        async fn search(
            &self,
            query: &str,
            top_k: usize,
        ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push((query.to_string(), top_k));
            }
            Ok(self.hits.clone())
        }
    }

    fn hit(content: &str, score: f64, corpus_order: i64, heading: &str) -> RetrievedPassage {
        RetrievedPassage {
            content: content.to_string(),
            score,
            rank: 0,
            document_id: "doc-1".to_string(),
            passage_id: corpus_order as u64,
            metadata: PassageMetadata {
                corpus_order,
                corpus_subsection: heading.to_string(),
                source_url: "https://example.org/plan.pdf".to_string(),
                starting_page_number: Some(corpus_order as u32),
                ..PassageMetadata::default()
            },
        }
    }

    fn fixture() -> FakeRetriever {
        FakeRetriever {
            hits: vec![
                hit("X", 1.0, 1, "Chapter 1 - Budget"),
                hit("Z", 0.5, 2, "Chapter 2"),
                hit("Y", 2.0, 1, "ignored heading"),
            ],
            requests: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn call_merges_reranks_and_formats() {
        let retriever = Arc::new(fixture());
        let tool = RetrievalTool::new(Arc::clone(&retriever), ConsolidationOptions::default());

        let results = tool
            .call(&json!({ "query": "budget" }))
            .await
            .expect("call should succeed");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "Z");
        assert_eq!(results[0].title, "Chapter 2");
        assert_eq!(results[1].text, "X Y");
        assert_eq!(results[1].title, "Budget");
        assert_eq!(results[1].excerpt_headline, "Chapter 1");
        assert_eq!(results[1].url, "https://example.org/plan.pdf#page=1");

        let requests = retriever.requests.lock().expect("lock").clone();
        assert_eq!(requests, vec![("budget".to_string(), 10)]);
    }

    #[tokio::test]
    async fn descending_option_reverses_ranking() {
        let options = ConsolidationOptions {
            order: RankOrder::Descending,
            ..ConsolidationOptions::default()
        };
        let tool = RetrievalTool::new(Arc::new(fixture()), options);

        let ranked = tool.retrieve("budget").await.expect("retrieve");
        assert_eq!(ranked[0].content, "X Y");
        assert_eq!(ranked[0].rank, 1);
    }

    #[tokio::test]
    async fn missing_query_is_rejected_as_empty() {
        let tool = RetrievalTool::new(Arc::new(fixture()), ConsolidationOptions::default());
        let error = tool.call(&json!({})).await.unwrap_err();
        assert!(matches!(error, RetrievalError::EmptyQuery));

        let error = tool.call(&json!({ "query": "   " })).await.unwrap_err();
        assert!(matches!(error, RetrievalError::EmptyQuery));
    }

    #[tokio::test]
    async fn non_string_query_is_invalid() {
        let tool = RetrievalTool::new(Arc::new(fixture()), ConsolidationOptions::default());
        let error = tool.call(&json!({ "query": 7 })).await.unwrap_err();
        assert!(matches!(error, RetrievalError::InvalidParameters(_)));

        let error = tool.call(&json!("budget")).await.unwrap_err();
        assert!(matches!(error, RetrievalError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn empty_retrieval_yields_no_results() {
        let tool = RetrievalTool::new(
            Arc::new(FakeRetriever::default()),
            ConsolidationOptions::default(),
        );
        let results = tool.search("anything").await.expect("search");
        assert!(results.is_empty());
        assert!(RetrievalTool::<FakeRetriever>::is_available());
    }
}
