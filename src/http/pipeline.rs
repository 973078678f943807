//! Route pipeline composition.
//!
//! # Data Flow
//! ```text
//! PipelineBuilder (named stages, supplied in any order)
//!     → build(): fixed order
//!         request logger → pre-handlers → request validator
//!         → response validator → handlers
//!     → Pipeline (immutable, Arc-shared)
//!
//! Request
//!     → Pipeline::handle (resolve correlation id)
//!     → Next::run → StageAdapter → stage ... → Response
//!     → on error: ErrorHandler::handle (exactly once)
//! ```

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    routing::{on, MethodFilter, MethodRouter},
};
use std::sync::Arc;

use crate::http::error::Stage;
use crate::http::middleware::{adapter::StageAdapter, BoxedMiddleware, Next};
use crate::http::request::{resolve_correlation_id, CorrelationIdExtractor};
use crate::http::response::{ErrorContext, ErrorHandler};

/// Collects the stages of a route and emits them in the fixed order.
#[derive(Default)]
pub struct PipelineBuilder {
    request_logger: Option<BoxedMiddleware>,
    pre_handlers: Vec<BoxedMiddleware>,
    request_validator: Option<BoxedMiddleware>,
    response_validator: Option<BoxedMiddleware>,
    handlers: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_logger(mut self, logger: BoxedMiddleware) -> Self {
        self.request_logger = Some(logger);
        self
    }

    /// Append pre-handlers, keeping their order.
    pub fn pre_handlers(mut self, pre_handlers: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        self.pre_handlers.extend(pre_handlers);
        self
    }

    pub fn request_validator(mut self, validator: BoxedMiddleware) -> Self {
        self.request_validator = Some(validator);
        self
    }

    pub fn response_validator(mut self, validator: BoxedMiddleware) -> Self {
        self.response_validator = Some(validator);
        self
    }

    /// Append terminal handlers, keeping their order.
    pub fn handlers(mut self, handlers: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        self.handlers.extend(handlers);
        self
    }

    /// Stages in execution order.
    pub fn stages(&self) -> Vec<Stage> {
        self.ordered().map(|(stage, _)| stage).collect()
    }

    fn ordered(&self) -> impl Iterator<Item = (Stage, &BoxedMiddleware)> + '_ {
        self.request_logger
            .iter()
            .map(|m| (Stage::RequestLogger, m))
            .chain(self.pre_handlers.iter().map(|m| (Stage::PreHandler, m)))
            .chain(self.request_validator.iter().map(|m| (Stage::RequestValidator, m)))
            .chain(self.response_validator.iter().map(|m| (Stage::ResponseValidator, m)))
            .chain(self.handlers.iter().map(|m| (Stage::Handler, m)))
    }

    pub fn build(
        self,
        method: Method,
        route: impl Into<String>,
        correlation_id_extractor: CorrelationIdExtractor,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Pipeline {
        let stages: Vec<StageAdapter> = self
            .ordered()
            .map(|(stage, m)| StageAdapter::new(stage, Arc::clone(m)))
            .collect();

        Pipeline {
            inner: Arc::new(PipelineInner {
                stages: stages.into(),
                method,
                route: route.into(),
                correlation_id_extractor,
                error_handler,
            }),
        }
    }
}

/// An installed middleware chain for one route.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    stages: Arc<[StageAdapter]>,
    method: Method,
    route: String,
    correlation_id_extractor: CorrelationIdExtractor,
    error_handler: Arc<dyn ErrorHandler>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run the chain; failures go to the error channel.
    pub async fn handle(&self, mut req: Request<Body>) -> Response {
        let correlation_id = resolve_correlation_id(&self.inner.correlation_id_extractor, &req);
        req.extensions_mut().insert(correlation_id.clone());

        match Next::new(Arc::clone(&self.inner.stages)).run(req).await {
            Ok(response) => response,
            Err(err) => {
                let ctx = ErrorContext {
                    method: self.inner.method.clone(),
                    route: self.inner.route.clone(),
                    correlation_id: Some(correlation_id.0),
                };
                self.inner.error_handler.handle(err, &ctx)
            }
        }
    }

    /// Stages in execution order.
    pub fn stages(&self) -> Vec<Stage> {
        self.inner.stages.iter().map(StageAdapter::stage).collect()
    }

    pub fn route(&self) -> &str {
        &self.inner.route
    }

    /// Wrap the pipeline as an axum method router for `filter`.
    pub fn into_method_router(self, filter: MethodFilter) -> MethodRouter {
        on(filter, move |req: Request<Body>| {
            let pipeline = self.clone();
            async move { pipeline.handle(req).await }
        })
    }
}
