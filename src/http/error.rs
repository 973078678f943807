//! Request-time errors.
//!
//! Every failure inside a route pipeline becomes a [`RouteError`]. The stage
//! adapter stamps the error with the [`Stage`] that raised it before it
//! reaches the error channel, so the centralized handler can tell a
//! validation rejection from a business-logic failure.

use axum::http::StatusCode;
use serde::Serialize;
use std::fmt;

use crate::validation::RequestPart;

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RequestLogger,
    PreHandler,
    RequestValidator,
    ResponseValidator,
    Handler,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RequestLogger => "request_logger",
            Stage::PreHandler => "pre_handler",
            Stage::RequestValidator => "request_validator",
            Stage::ResponseValidator => "response_validator",
            Stage::Handler => "handler",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad classification of a [`RouteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request did not match its declared schema.
    Validation,
    /// Error returned by caller-supplied middleware or handlers.
    Handler,
    /// A stage panicked.
    Panic,
    /// The chain ran past its last stage without producing a response.
    Unhandled,
    /// Request body exceeded the configured limit.
    PayloadTooLarge,
    /// Failure inside the registrar's own plumbing.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Handler => "handler",
            ErrorKind::Panic => "panic",
            ErrorKind::Unhandled => "unhandled",
            ErrorKind::PayloadTooLarge => "payload_too_large",
            ErrorKind::Internal => "internal",
        }
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Request part the violation was found in.
    pub part: RequestPart,
    /// Human-readable message from the schema validator.
    pub message: String,
}

impl FieldError {
    pub fn new(part: RequestPart, message: impl Into<String>) -> Self {
        Self {
            part,
            message: message.into(),
        }
    }
}

/// Error raised while running a route pipeline.
#[derive(Debug)]
pub struct RouteError {
    status: StatusCode,
    kind: ErrorKind,
    message: String,
    fields: Vec<FieldError>,
    stage: Option<Stage>,
}

pub type RouteResult<T = axum::response::Response> = Result<T, RouteError>;

impl RouteError {
    /// Create a handler error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            kind: ErrorKind::Handler,
            message: message.into(),
            fields: Vec::new(),
            stage: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message).with_kind(ErrorKind::Internal)
    }

    /// Request schema rejection carrying one entry per violation.
    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: ErrorKind::Validation,
            message: "Request validation failed".to_string(),
            fields,
            stage: None,
        }
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body exceeds {} bytes", limit),
        )
        .with_kind(ErrorKind::PayloadTooLarge)
    }

    /// No stage produced a response.
    pub fn unhandled(method: &axum::http::Method, path: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Cannot {} {}", method, path))
            .with_kind(ErrorKind::Unhandled)
    }

    pub fn panic(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message).with_kind(ErrorKind::Panic)
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Stamp the raising stage unless an inner stage already did.
    pub fn classify(mut self, stage: Stage) -> Self {
        if self.stage.is_none() {
            self.stage = Some(stage);
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)?;
        if let Some(stage) = self.stage {
            write!(f, " (stage: {})", stage)?;
        }
        Ok(())
    }
}

impl std::error::Error for RouteError {}

impl From<serde_json::Error> for RouteError {
    fn from(err: serde_json::Error) -> Self {
        RouteError::bad_request(format!("Invalid JSON: {}", err))
    }
}

impl From<axum::Error> for RouteError {
    fn from(err: axum::Error) -> Self {
        RouteError::internal(format!("Body error: {}", err))
    }
}

impl From<std::io::Error> for RouteError {
    fn from(err: std::io::Error) -> Self {
        RouteError::internal(format!("I/O error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keeps_innermost_stage() {
        let err = RouteError::bad_request("nope")
            .classify(Stage::Handler)
            .classify(Stage::RequestLogger);
        assert_eq!(err.stage(), Some(Stage::Handler));
    }

    #[test]
    fn test_validation_error_shape() {
        let err = RouteError::validation(vec![FieldError::new(RequestPart::Body, "bad")]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.is_validation());
        assert_eq!(err.fields().len(), 1);
    }

    #[test]
    fn test_display_includes_stage() {
        let err = RouteError::internal("boom").classify(Stage::ResponseValidator);
        assert_eq!(err.to_string(), "internal: boom (stage: response_validator)");
    }
}
