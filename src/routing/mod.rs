//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup)
//!     → matcher.rs (segment-aware prefix match)
//!     → Return: matched RouteEntry or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[] + service map
//!     → Resolve service base URLs
//!     → Sort by prefix specificity
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - Longest prefix wins

pub mod matcher;
pub mod resolve;
pub mod router;

pub use matcher::{PathPrefixMatcher, VersionedHostMatcher};
pub use resolve::resolve_route_middleware;
pub use router::{RouteEntry, RouteTable, RoutingError};
