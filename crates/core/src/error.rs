use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("query is empty")]
    EmptyQuery,

    #[error("invalid tool parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T, E = RetrievalError> = std::result::Result<T, E>;
