//! Error-forwarding stage adapter.
//!
//! Every stage of a pipeline runs behind a [`StageAdapter`]. A returned error
//! is stamped with the stage and passed up; a panic, whether raised while
//! building the stage future or while polling it, becomes a
//! [`RouteError::panic`] instead of unwinding into the server.

use axum::{body::Body, http::Request};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::http::error::{RouteError, RouteResult, Stage};
use crate::http::middleware::{BoxFuture, BoxedMiddleware, Next};

pub(crate) struct StageAdapter {
    stage: Stage,
    inner: BoxedMiddleware,
}

impl StageAdapter {
    pub(crate) fn new(stage: Stage, inner: BoxedMiddleware) -> Self {
        Self { stage, inner }
    }

    pub(crate) fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn invoke(&self, req: Request<Body>, next: Next) -> BoxFuture<'static, RouteResult> {
        let stage = self.stage;

        let fut = match panic::catch_unwind(AssertUnwindSafe(|| self.inner.call(req, next))) {
            Ok(fut) => fut,
            Err(payload) => {
                let err = panicked(stage, payload.as_ref());
                return Box::pin(async move { Err(err) });
            }
        };

        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result.map_err(|err| err.classify(stage)),
                Err(payload) => Err(panicked(stage, payload.as_ref())),
            }
        })
    }
}

fn panicked(stage: Stage, payload: &(dyn Any + Send)) -> RouteError {
    let message = if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "stage panicked".to_string()
    };
    tracing::error!(stage = %stage, panic_message = %message, "Route stage panicked");
    RouteError::panic(message).classify(stage)
}
