//! Route definitions handed to the registrar.

use axum::{body::Body, http::Request, response::IntoResponse};
use std::future::Future;

use crate::http::error::RouteError;
use crate::http::middleware::{self, BoxedMiddleware};
use crate::validation::RouteSchema;

/// Everything needed to register one route.
///
/// ```ignore
/// registrar.post(
///     RouteDefinition::new("/items", "createItem")
///         .schema(schema)
///         .tag("items")
///         .handle(|req| async move { Ok::<_, RouteError>("created") }),
/// )?;
/// ```
pub struct RouteDefinition {
    pub(crate) url: String,
    pub(crate) operation_id: String,
    pub(crate) pre_handlers: Vec<BoxedMiddleware>,
    pub(crate) handlers: Vec<BoxedMiddleware>,
    pub(crate) schema: Option<RouteSchema>,
    pub(crate) is_public: bool,
    pub(crate) tags: Vec<String>,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) warn_on_request_validation_error: bool,
}

impl RouteDefinition {
    pub fn new(url: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            operation_id: operation_id.into(),
            pre_handlers: Vec::new(),
            handlers: Vec::new(),
            schema: None,
            is_public: false,
            tags: Vec::new(),
            summary: None,
            description: None,
            warn_on_request_validation_error: false,
        }
    }

    /// Append a middleware that runs before validation.
    pub fn pre_handler(mut self, middleware: BoxedMiddleware) -> Self {
        self.pre_handlers.push(middleware);
        self
    }

    pub fn pre_handlers(mut self, middleware: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        self.pre_handlers.extend(middleware);
        self
    }

    /// Append a handler stage. Only the last one needs to answer.
    pub fn handler(mut self, handler: BoxedMiddleware) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handlers(mut self, handlers: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        self.handlers.extend(handlers);
        self
    }

    /// Append a terminal async handler.
    pub fn handle<F, Fut, R>(self, f: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
        R: IntoResponse,
    {
        self.handler(middleware::handler(f))
    }

    pub fn schema(mut self, schema: RouteSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Public routes are documented with an empty security requirement.
    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Log request validation failures and let the request through.
    pub fn warn_on_request_validation_error(mut self, warn: bool) -> Self {
        self.warn_on_request_validation_error = warn;
        self
    }
}
