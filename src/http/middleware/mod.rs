//! Route middleware.
//!
//! A route is served by a chain of [`Middleware`] stages. Each stage receives
//! the request and a [`Next`] handle; it either answers the request itself or
//! passes it on with `next.run(request)`. Failures are returned as
//! [`RouteError`] and travel back up the chain to the pipeline entry point,
//! which hands them to the error channel once.
//!
//! # Design Decisions
//! - Stages are `Arc<dyn Middleware>` so one pre-handler can be shared by many routes
//! - Closures `Fn(Request, Next) -> Future` are middleware out of the box
//! - Terminal handlers are middleware that never call `next`

pub mod adapter;

use axum::{
    body::Body,
    http::Request,
    response::IntoResponse,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::http::error::{RouteError, RouteResult};
use self::adapter::StageAdapter;

/// Boxed future returned by every stage.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Shared handle to a middleware stage.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A single request-processing stage.
pub trait Middleware: Send + Sync + 'static {
    /// Handle the request, calling `next` to continue the chain.
    fn call(&self, req: Request<Body>, next: Next) -> BoxFuture<'static, RouteResult>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RouteResult> + Send + 'static,
{
    fn call(&self, req: Request<Body>, next: Next) -> BoxFuture<'static, RouteResult> {
        Box::pin(self(req, next))
    }
}

/// The remainder of a route's chain.
#[derive(Clone)]
pub struct Next {
    stages: Arc<[StageAdapter]>,
    index: usize,
}

impl Next {
    pub(crate) fn new(stages: Arc<[StageAdapter]>) -> Self {
        Self { stages, index: 0 }
    }

    /// Run the next stage. Running past the last stage is an unhandled request.
    pub fn run(self, req: Request<Body>) -> BoxFuture<'static, RouteResult> {
        match self.stages.get(self.index) {
            Some(stage) => {
                let next = Next {
                    stages: Arc::clone(&self.stages),
                    index: self.index + 1,
                };
                stage.invoke(req, next)
            }
            None => {
                let err = RouteError::unhandled(req.method(), req.uri().path());
                Box::pin(async move { Err(err) })
            }
        }
    }
}

/// Box a `Fn(Request, Next)` closure as middleware.
pub fn from_fn<F, Fut>(f: F) -> BoxedMiddleware
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RouteResult> + Send + 'static,
{
    Arc::new(f)
}

/// Turn a terminal request handler into middleware.
///
/// The handler never sees `next`; whatever it returns ends the chain.
pub fn handler<F, Fut, R>(f: F) -> BoxedMiddleware
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(HandlerFn { f })
}

struct HandlerFn<F> {
    f: F,
}

impl<F, Fut, R> Middleware for HandlerFn<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, RouteError>> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, req: Request<Body>, _next: Next) -> BoxFuture<'static, RouteResult> {
        let fut = (self.f)(req);
        Box::pin(async move { fut.await.map(IntoResponse::into_response) })
    }
}
