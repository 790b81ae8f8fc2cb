use crate::cache::SchemaCache;
use crate::errors::{SchemaError, SchemaServerError};
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS};
use crate::reference::Reference;
use crate::upstream::Upstream;
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use shared::http::{empty_body, full_body, make_boxed_error_response};
use shared::{counter, histogram};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

pub type ResponseBody = BoxBody<Bytes, SchemaServerError>;

/// Answers `GET|HEAD /{ref}`: released versions are served from the schema
/// cache, every other ref is redirected to the upstream document.
#[derive(Clone)]
pub struct SchemaService {
    upstream: Arc<Upstream>,
    cache: SchemaCache,
}

impl SchemaService {
    pub fn new(upstream: Upstream, cache: SchemaCache) -> Self {
        Self {
            upstream: Arc::new(upstream),
            cache,
        }
    }

    pub async fn handle(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<Response<ResponseBody>, SchemaServerError> {
        let started = Instant::now();
        let (outcome, response) = self.respond(method, path).await?;

        counter!(REQUESTS, "outcome" => outcome).increment(1);
        histogram!(REQUEST_DURATION, "outcome" => outcome).record(started.elapsed().as_secs_f64());

        Ok(response)
    }

    async fn respond(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<(&'static str, Response<ResponseBody>), SchemaServerError> {
        let Some(reference) = Reference::parse(path) else {
            return Ok(("unmatched", make_boxed_error_response(StatusCode::NOT_FOUND)));
        };

        if !matches!(*method, Method::GET | Method::HEAD) {
            return Ok((
                "method_not_allowed",
                make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED),
            ));
        }

        let schema_url = self.upstream.schema_url(&reference);

        if !reference.is_cacheable() {
            tracing::debug!(?reference, %schema_url, "Redirecting to upstream");
            let response = Response::builder()
                .status(StatusCode::TEMPORARY_REDIRECT)
                .header(LOCATION, schema_url.as_str())
                .body(empty_body())?;
            return Ok(("redirect", response));
        }

        match self.cache.get(schema_url.as_str()).await {
            Ok(schema) => {
                let response = Response::builder()
                    .status(StatusCode::OK)
                    .header(CONTENT_TYPE, "application/json")
                    .header(CONTENT_LENGTH, schema.len())
                    .body(match *method {
                        Method::HEAD => empty_body(),
                        _ => full_body(schema),
                    })?;
                Ok(("schema", response))
            }
            Err(SchemaError::NotFound) => {
                Ok(("not_found", make_boxed_error_response(StatusCode::NOT_FOUND)))
            }
            Err(e) => {
                tracing::error!(error = %e, %schema_url, "Could not load schema");
                let response = Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                    .body(full_body(format!("{e}\n")))?;
                Ok(("upstream_error", response))
            }
        }
    }
}

impl Service<Request<Incoming>> for SchemaService {
    type Response = Response<ResponseBody>;
    type Error = SchemaServerError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        Box::pin(async move { service.handle(&method, &path).await })
    }
}
