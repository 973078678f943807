//! Request correlation.
//!
//! # Responsibilities
//! - Derive a per-request correlation id for log correlation
//! - Expose the id to every stage as a request extension
//!
//! # Design Decisions
//! - The extractor is pluggable; the default reads `x-correlation-id`, then `x-request-id`
//! - A missing or empty id falls back to a fresh UUID v4
//! - The id is resolved once, at the pipeline entry point

use axum::{body::Body, http::Request};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Header set by the server harness request id layer.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header commonly forwarded by upstream callers.
pub const X_CORRELATION_ID: &str = "x-correlation-id";

/// Derives a correlation id from an incoming request.
pub type CorrelationIdExtractor = Arc<dyn Fn(&Request<Body>) -> Option<String> + Send + Sync>;

/// Correlation id attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extension trait for reading the correlation id off a request.
pub trait CorrelationIdExt {
    fn correlation_id(&self) -> Option<&CorrelationId>;
}

impl<B> CorrelationIdExt for Request<B> {
    fn correlation_id(&self) -> Option<&CorrelationId> {
        self.extensions().get::<CorrelationId>()
    }
}

/// Extractor reading the first non-empty header among `x-correlation-id` and `x-request-id`.
pub fn default_correlation_id_extractor() -> CorrelationIdExtractor {
    Arc::new(|req: &Request<Body>| {
        header_value(req, X_CORRELATION_ID).or_else(|| header_value(req, X_REQUEST_ID))
    })
}

/// Extractor reading a single named header.
pub fn header_correlation_id_extractor(name: impl Into<String>) -> CorrelationIdExtractor {
    let name = name.into();
    Arc::new(move |req: &Request<Body>| header_value(req, &name))
}

fn header_value(req: &Request<Body>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn resolve_correlation_id(
    extractor: &CorrelationIdExtractor,
    req: &Request<Body>,
) -> CorrelationId {
    let id = extractor(req)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    CorrelationId(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extractor_prefers_correlation_header() {
        let req = Request::builder()
            .header(X_REQUEST_ID, "req-1")
            .header(X_CORRELATION_ID, "corr-1")
            .body(Body::empty())
            .unwrap();
        let extractor = default_correlation_id_extractor();
        assert_eq!(extractor(&req).as_deref(), Some("corr-1"));
    }

    #[test]
    fn test_default_extractor_falls_back_to_request_id() {
        let req = Request::builder()
            .header(X_CORRELATION_ID, "   ")
            .header(X_REQUEST_ID, "req-1")
            .body(Body::empty())
            .unwrap();
        let extractor = default_correlation_id_extractor();
        assert_eq!(extractor(&req).as_deref(), Some("req-1"));
    }

    #[test]
    fn test_missing_id_generates_uuid() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let id = resolve_correlation_id(&default_correlation_id_extractor(), &req);
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_named_header_extractor() {
        let req = Request::builder()
            .header("x-trace", "abc")
            .body(Body::empty())
            .unwrap();
        let extractor = header_correlation_id_extractor("x-trace");
        assert_eq!(extractor(&req).as_deref(), Some("abc"));
    }
}
