//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace, timeout)
//!     → axum Router (per route: Pipeline from pipeline.rs)
//!         request.rs    (correlation id)
//!         middleware/   (stages, Next, panic-safe adapter)
//!         error.rs      (RouteError, tagged with its stage)
//!     → response.rs (error channel on failure)
//!     → Send to client
//! ```

pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ErrorKind, FieldError, RouteError, RouteResult, Stage};
pub use middleware::{from_fn, handler, BoxedMiddleware, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use request::{CorrelationId, CorrelationIdExt, CorrelationIdExtractor, X_CORRELATION_ID, X_REQUEST_ID};
pub use response::{error_response, ErrorContext, ErrorHandler, JsonErrorHandler};
pub use server::HttpServer;
