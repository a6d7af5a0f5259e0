//! Address denylist.
//!
//! # Responsibilities
//! - Resolve the originating client address (trusted proxies honored)
//! - Refuse denylisted addresses before any other work
//! - Publish the resolved address as [`ClientAddr`]

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::SecurityConfig;
use crate::error::GatewayError;
use crate::http::context::ClientAddr;
use crate::observability::metrics;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Default)]
pub struct Denylist {
    blocked: HashSet<IpAddr>,
    trusted_proxies: HashSet<IpAddr>,
}

impl Denylist {
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            blocked: config.denylist.iter().copied().collect(),
            trusted_proxies: config.trusted_proxies.iter().copied().collect(),
        }
    }

    pub fn is_blocked(&self, addr: IpAddr) -> bool {
        self.blocked.contains(&addr)
    }

    /// The originating address of a request received from `peer`.
    ///
    /// `X-Forwarded-For` is only consulted when the peer is a trusted proxy.
    /// Hops are walked from the right, skipping trusted proxies; the first
    /// untrusted hop is the client. Entries left of it are client-written and
    /// ignored. An unparseable hop stops the walk at the last address vouched for.
    pub fn resolve_client(&self, peer: IpAddr, headers: &HeaderMap) -> IpAddr {
        if !self.trusted_proxies.contains(&peer) {
            return peer;
        }
        let hops: Vec<&str> = headers
            .get_all(X_FORWARDED_FOR)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .collect();

        let mut client = peer;
        for hop in hops.iter().rev() {
            match hop.trim().parse::<IpAddr>() {
                Ok(addr) => {
                    client = addr;
                    if !self.trusted_proxies.contains(&addr) {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        client
    }
}

pub async fn denylist_middleware(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(denylist): State<Arc<Denylist>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let client = denylist.resolve_client(peer.ip(), request.headers());

    if denylist.is_blocked(client) {
        tracing::warn!(client = %client, path = %request.uri().path(), "Denylisted address refused");
        metrics::record_denied();
        return GatewayError::Forbidden.into_response();
    }

    request.extensions_mut().insert(ClientAddr(client));
    next.run(request).await
}
