//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (hardening headers on the way out)
//!     → denylist.rs (resolve client address, refuse blocked ones)
//!     → [route resolution]
//!     → auth.rs (verify bearer token, attach Identity)
//!     → rate_limit.rs (sliding-window policies, slow-down)
//!     → limits.rs (body size, content type, JSON parse)
//!     → Pass to cache / proxy
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input: identity comes only from verified tokens

pub mod auth;
pub mod denylist;
pub mod headers;
pub mod limits;
pub mod rate_limit;

pub use auth::{AuthSetupError, AuthVerifier, Claims, Identity};
pub use denylist::Denylist;
pub use limits::BodyLimits;
pub use rate_limit::{RateLimiter, SlidingWindowLimiter};
