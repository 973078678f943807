//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use routekeeper::{Next, RouteError};
use routekeeper::http::BoxedMiddleware;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Response captured from an in-process request.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Build a request, with a JSON body when `body` is given.
pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Drive `router` with one request, in process.
pub async fn send(router: &Router, req: Request<Body>) -> TestResponse {
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec();
    TestResponse { status, headers, body }
}

/// Ordered record of stage executions.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Pre-handler that records `label` and continues.
    pub fn pre_handler(&self, label: &'static str) -> BoxedMiddleware {
        let trace = self.clone();
        routekeeper::from_fn(move |req, next: Next| {
            trace.push(label);
            next.run(req)
        })
    }

    /// Terminal handler that records `label` and answers with `body`.
    pub fn handler(&self, label: &'static str, body: Value) -> BoxedMiddleware {
        let trace = self.clone();
        routekeeper::handler(move |_req| {
            trace.push(label);
            let body = body.clone();
            async move { Ok::<_, RouteError>(axum::Json(body)) }
        })
    }
}

/// Install a thread-local subscriber that records event messages into
/// `trace`. Keep the guard alive for the duration of the test.
pub fn capture_logs(trace: &Trace) -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::registry().with(Capture(trace.clone()));
    tracing::subscriber::set_default(subscriber)
}

struct Capture(Trace);

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0.push(visitor.0);
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}
