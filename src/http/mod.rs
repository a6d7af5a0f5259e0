//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, outer layers, chain assembly)
//!     → request.rs (correlation id)
//!     → context.rs (typed extensions written by each chain step)
//!     → [security → cache → proxy]
//!     → Send to client
//! ```

pub mod context;
pub mod health;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{GatewayServer, StartupError};
