use crate::traits::PassageRetriever;
use crate::{RetrievalError, RetrievedPassage};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const BACKEND: &str = "colbert-http";

/// Client for a retriever service that keeps the passage index loaded.
pub struct HttpRetrieverStore {
    client: Arc<Client>,
    search_url: Url,
}

impl HttpRetrieverStore {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RetrievalError> {
        let base = Url::parse(endpoint.trim_end_matches('/'))?;
        let search_url = Url::parse(&format!("{}/search", base.as_str().trim_end_matches('/')))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            search_url,
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

#[async_trait]
impl PassageRetriever for HttpRetrieverStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        let response = self
            .client
            .post(self.search_url.clone())
            .json(&json!({ "query": query, "k": top_k }))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %self.search_url, "retriever rejected search");
            return Err(RetrievalError::BackendResponse {
                backend: BACKEND.to_string(),
                details: response.status().to_string(),
            });
        }

        let response_json: Value = response.json().await?;
        let passages = parse_search_response(response_json)?;
        debug!(hits = passages.len(), "retriever returned passages");
        Ok(passages)
    }
}

/// Accepts either a bare array of passages or an object with a `results` array.
pub fn parse_search_response(response: Value) -> Result<Vec<RetrievedPassage>, RetrievalError> {
    let hits = match response {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(RetrievalError::BackendResponse {
                    backend: BACKEND.to_string(),
                    details: "response has no results array".to_string(),
                })
            }
        },
        other => {
            return Err(RetrievalError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("unexpected response shape: {other}"),
            })
        }
    };

    hits.into_iter()
        .map(|hit| serde_json::from_value(hit).map_err(RetrievalError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(content: &str, corpus_order: i64) -> Value {
        json!({
            "content": content,
            "score": 12.5,
            "rank": 1,
            "document_id": "doc",
            "passage_id": 1,
            "document_metadata": { "corpus_order": corpus_order }
        })
    }

    #[test]
    fn bare_array_response_parses() {
        let parsed = parse_search_response(json!([hit("a", 1), hit("b", 2)])).expect("parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].section_order(), 2);
    }

    #[test]
    fn wrapped_results_response_parses() {
        let parsed = parse_search_response(json!({ "results": [hit("a", 4)] })).expect("parse");
        assert_eq!(parsed[0].content, "a");
    }

    #[test]
    fn missing_results_is_backend_error() {
        let error = parse_search_response(json!({ "hits": [] })).unwrap_err();
        assert!(matches!(error, RetrievalError::BackendResponse { .. }));
    }

    #[test]
    fn malformed_hit_is_serialization_error() {
        let error = parse_search_response(json!([{ "content": "no score" }])).unwrap_err();
        assert!(matches!(error, RetrievalError::Serialization(_)));
    }

    #[test]
    fn search_url_appends_path() {
        let store = HttpRetrieverStore::new("http://localhost:8893/", Duration::from_secs(5))
            .expect("valid endpoint");
        assert_eq!(store.search_url().as_str(), "http://localhost:8893/search");
    }
}
