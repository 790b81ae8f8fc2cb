use crate::config::ValidationError;
use http::StatusCode;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Result of resolving a schema URL. Cloned to every caller waiting on the
/// same fetch.
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    #[error("schema not found")]
    NotFound,

    #[error("failed to fetch schema: {0}")]
    FetchFailed(#[source] Arc<FetchFailure>),
}

impl From<FetchFailure> for SchemaError {
    fn from(failure: FetchFailure) -> Self {
        SchemaError::FetchFailed(Arc::new(failure))
    }
}

impl SchemaError {
    /// Short label used for logs and metric tags.
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaError::NotFound => "not_found",
            SchemaError::FetchFailed(failure) => match failure.as_ref() {
                FetchFailure::Request(_) => "request",
                FetchFailure::UnexpectedStatus(_) => "status",
                FetchFailure::ReadBody(_) => "read_body",
                FetchFailure::Aborted => "aborted",
            },
        }
    }
}

/// Underlying cause of a failed upstream fetch
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected status code: {0}")]
    UnexpectedStatus(StatusCode),

    #[error("failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("fetch ended before producing a result")]
    Aborted,
}

/// Errors that stop the schema server from starting or serving
#[derive(Error, Debug)]
pub enum SchemaServerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("invalid upstream: {0}")]
    InvalidUpstream(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to build response: {0}")]
    Http(#[from] http::Error),
}
