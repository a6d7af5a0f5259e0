//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (http/server.rs):
//!     Load config → Validate → Build verifier, limiter, cache → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Stop sweepers
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - One broadcast reaches the server and all background tasks

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{spawn_signal_handler, wait_for_signal};
