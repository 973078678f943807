//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ObservabilityConfig → logging.rs (tracing-subscriber registry)
//!
//! Per request (when `log_requests` is on):
//!     request_logger.rs (first pipeline stage)
//!         → `request` span with correlation id
//!         → start / completion / failure events
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Correlation id flows into every event of the request span
//! - No printing: every diagnostic goes through `tracing`

pub mod logging;
pub mod request_logger;

pub use logging::init_logging;
pub use request_logger::RequestLogger;
