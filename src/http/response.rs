//! Centralized error channel.
//!
//! # Responsibilities
//! - Turn a failed pipeline into the response sent to the client
//! - Log the failure once, with the stage that raised it
//!
//! # Design Decisions
//! - Exactly one call per failed request, made by the pipeline entry point
//! - Server errors log at `error`, client errors at `warn`
//! - JSON body shape is stable: `{ "error": {..}, "request_id": ".." }`

use axum::{
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::error::{FieldError, RouteError, Stage};

/// Where a failure happened.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Method the route was registered for.
    pub method: Method,
    /// Route pattern (not the concrete request path).
    pub route: String,
    /// Correlation id of the failed request.
    pub correlation_id: Option<String>,
}

/// Receives every failure of a route pipeline.
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle(&self, err: RouteError, ctx: &ErrorContext) -> Response;
}

impl<F> ErrorHandler for F
where
    F: Fn(RouteError, &ErrorContext) -> Response + Send + Sync + 'static,
{
    fn handle(&self, err: RouteError, ctx: &ErrorContext) -> Response {
        self(err, ctx)
    }
}

/// Default error channel: logs and renders a JSON error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorHandler;

impl ErrorHandler for JsonErrorHandler {
    fn handle(&self, err: RouteError, ctx: &ErrorContext) -> Response {
        let status = err.status();
        let request_id = ctx.correlation_id.as_deref().unwrap_or("unknown");
        let stage = err.stage().map(|s| s.as_str()).unwrap_or("unknown");

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                method = %ctx.method,
                route = %ctx.route,
                stage = %stage,
                status = status.as_u16(),
                error = %err,
                "Route failed"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                method = %ctx.method,
                route = %ctx.route,
                stage = %stage,
                status = status.as_u16(),
                error = %err,
                "Route rejected request"
            );
        }

        error_response(err, ctx.correlation_id.clone())
    }
}

/// JSON representation of a route error.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// Render an error as `status + JSON body` without logging.
pub fn error_response(err: RouteError, request_id: Option<String>) -> Response {
    let status = err.status();
    let body = ErrorResponse {
        error: ErrorBody {
            error_type: err.kind().as_str(),
            message: err.message().to_string(),
            stage: err.stage(),
            fields: err.fields().to_vec(),
        },
        request_id,
    };
    (status, Json(body)).into_response()
}
