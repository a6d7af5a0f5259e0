//! Edge gateway library.
//!
//! A single public entry point in front of a set of backend services:
//! address denylist, bearer token verification, sliding-window rate limiting,
//! a TTL response cache and a sanitizing reverse proxy, in that order.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod proxy;
pub mod routing;

// Request chain
pub mod cache;
pub mod security;
pub mod store;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use http::{GatewayServer, StartupError};
pub use lifecycle::Shutdown;
