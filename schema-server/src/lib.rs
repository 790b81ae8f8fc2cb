pub mod cache;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod metrics_defs;
pub mod reference;
pub mod service;
pub mod upstream;

#[cfg(test)]
mod testutils;

use cache::SchemaCache;
use errors::SchemaServerError;
use fetcher::HttpFetcher;
use service::SchemaService;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;
use upstream::Upstream;

/// Builds the schema service from config and serves it until a listener fails.
pub async fn run(config: config::Config) -> Result<(), SchemaServerError> {
    config.validate()?;
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    let service = build_service(&config)?;
    let server_task = run_http_service(&config.listener.host, config.listener.port, service);

    match &config.admin_listener {
        Some(admin_listener) => {
            // The cache fills lazily, so the server is ready as soon as it listens
            let admin_service = AdminService::<_, SchemaServerError>::new(|| true);
            let admin_task =
                run_http_service(&admin_listener.host, admin_listener.port, admin_service);
            tokio::try_join!(server_task, admin_task)?;
        }
        None => server_task.await?,
    }

    Ok(())
}

pub fn build_service(config: &config::Config) -> Result<SchemaService, SchemaServerError> {
    let upstream = Upstream::try_from(config.upstream.clone())?;
    let fetcher = HttpFetcher::new(&config.transport)?;
    let cache = SchemaCache::new(Arc::new(fetcher));

    Ok(SchemaService::new(upstream, cache))
}
