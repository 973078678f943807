//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging → Register routes → Bind listener
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT or Shutdown::trigger → Stop accepting → Drain → Exit
//! ```
//!
//! # Design Decisions
//! - Registration errors are fatal: nothing is served with a partial table
//! - Shutdown is a broadcast so tests can stop a server without signals

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::forward_signals;
