use crate::config::TransportConfig;
use crate::errors::{FetchFailure, SchemaError};
use crate::metrics_defs::{UPSTREAM_FETCH_DURATION, UPSTREAM_FETCHES};
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use shared::{counter, histogram};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Loads a schema document from a URL.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<Bytes, SchemaError>;
}

/// Fetches schema documents over HTTP with a bounded number of concurrent
/// upstream requests.
pub struct HttpFetcher {
    client: reqwest::Client,
    // All requests go to the same upstream host, so this is the per-host cap.
    permits: Semaphore,
}

impl HttpFetcher {
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.max_idle_connections)
            .pool_idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.response_timeout_secs))
            .build()?;

        Ok(HttpFetcher {
            client,
            permits: Semaphore::new(config.max_connections),
        })
    }

    async fn get(&self, url: &str) -> Result<Bytes, SchemaError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchFailure::Aborted)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchFailure::Request)?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(SchemaError::NotFound),
            status => return Err(FetchFailure::UnexpectedStatus(status).into()),
        }

        let body = response.bytes().await.map_err(FetchFailure::ReadBody)?;
        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, SchemaError> {
        tracing::info!(url, "Load schema from upstream");
        let started = Instant::now();

        let result = self.get(url).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        counter!(UPSTREAM_FETCHES, "outcome" => outcome).increment(1);
        histogram!(UPSTREAM_FETCH_DURATION).record(started.elapsed().as_secs_f64());

        result
    }
}
