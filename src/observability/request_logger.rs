//! Request logger stage.
//!
//! # Responsibilities
//! - Open a `request` span carrying the correlation id
//! - Log request start, completion (status + latency) and failure
//!
//! # Design Decisions
//! - Always the first stage of a pipeline, so its span covers every later stage
//! - Failures are logged here and still returned; the error channel answers them

use axum::{body::Body, http::Request};
use std::time::Instant;
use tracing::Instrument;

use crate::http::error::RouteResult;
use crate::http::middleware::{BoxFuture, Middleware, Next};
use crate::http::request::CorrelationIdExt;

/// Logs each request passing through a route.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    route: String,
}

impl RequestLogger {
    /// Logger for the route registered under `route`.
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
        }
    }
}

impl Middleware for RequestLogger {
    fn call(&self, req: Request<Body>, next: Next) -> BoxFuture<'static, RouteResult> {
        let request_id = req
            .correlation_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let span = tracing::info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            route = %self.route,
        );

        Box::pin(
            async move {
                let start = Instant::now();
                tracing::info!(path = %path, "Request started");

                let result = next.run(req).await;
                let latency_ms = start.elapsed().as_millis() as u64;

                match &result {
                    Ok(response) => tracing::info!(
                        path = %path,
                        status = response.status().as_u16(),
                        latency_ms,
                        "Request completed"
                    ),
                    Err(err) => tracing::warn!(
                        path = %path,
                        status = err.status().as_u16(),
                        stage = ?err.stage(),
                        latency_ms,
                        error = %err,
                        "Request failed"
                    ),
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::RouteError;
    use crate::http::middleware::handler;
    use crate::http::pipeline::Pipeline;
    use crate::http::request::default_correlation_id_extractor;
    use crate::http::response::JsonErrorHandler;
    use axum::http::{Method, StatusCode};
    use std::sync::Arc;

    fn pipeline(result: fn() -> Result<&'static str, RouteError>) -> Pipeline {
        Pipeline::builder()
            .request_logger(Arc::new(RequestLogger::new("/logged")))
            .handlers([handler(move |_req| async move { result() })])
            .build(
                Method::GET,
                "/logged",
                default_correlation_id_extractor(),
                Arc::new(JsonErrorHandler),
            )
    }

    #[tokio::test]
    async fn test_passes_response_through() {
        let res = pipeline(|| Ok("hello"))
            .handle(Request::builder().uri("/logged").body(Body::empty()).unwrap())
            .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_passes_error_through() {
        let res = pipeline(|| Err(RouteError::bad_request("nope")))
            .handle(Request::builder().uri("/logged").body(Body::empty()).unwrap())
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
