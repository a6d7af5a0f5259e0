//! Reverse proxy subsystem.
//!
//! # Data Flow
//! ```text
//! handler.rs (terminal handler, reads request extensions)
//!     → request.rs (path rewrite, field renames, identity/forwarding headers)
//!     → forwarder.rs (pooled hyper client, bounded wait)
//!     → response.rs (strip headers and internal fields, add X-Gateway)
//!     → back out through the cache step
//! ```
//!
//! # Design Decisions
//! - Upstream transport failures never reach the client verbatim
//! - Full-body buffering on both legs keeps transformation simple

pub mod forwarder;
pub mod handler;
pub mod request;
pub mod response;

use axum::http::{header, HeaderMap, HeaderName};

pub use forwarder::Forwarder;
pub use handler::{proxy_handler, ProxyState};
pub use request::RequestTransformer;
pub use response::ResponseTransformer;

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(name);
    }
    for name in [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ] {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}
