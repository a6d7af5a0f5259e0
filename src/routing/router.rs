//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the most specific route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Routes sorted by specificity once, so the first hit is the longest prefix
//! - Explicit NoMatch rather than silent default

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::config::RouteConfig;
use crate::routing::matcher::PathPrefixMatcher;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("route '{route}' references unknown service '{service}'")]
    UnknownService { route: String, service: String },

    #[error("service '{service}' has invalid base URL: {source}")]
    InvalidUrl {
        service: String,
        #[source]
        source: url::ParseError,
    },

    #[error("route table is empty")]
    Empty,
}

/// A compiled, immutable route.
#[derive(Debug)]
pub struct RouteEntry {
    pub name: String,
    pub matcher: PathPrefixMatcher,
    pub service: String,
    pub target: Url,
    pub auth_required: bool,
}

/// The static route table.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Arc<RouteEntry>>,
}

impl RouteTable {
    /// Compile routes against the service map.
    pub fn from_config(
        routes: &[RouteConfig],
        services: &BTreeMap<String, String>,
    ) -> Result<Self, RoutingError> {
        if routes.is_empty() {
            return Err(RoutingError::Empty);
        }

        let mut compiled = Vec::with_capacity(routes.len());
        for route in routes {
            let base = services.get(&route.service).ok_or_else(|| RoutingError::UnknownService {
                route: route.name.clone(),
                service: route.service.clone(),
            })?;
            let target = Url::parse(base).map_err(|source| RoutingError::InvalidUrl {
                service: route.service.clone(),
                source,
            })?;

            compiled.push(Arc::new(RouteEntry {
                name: route.name.clone(),
                matcher: PathPrefixMatcher::new(route.path_prefix.as_str()),
                service: route.service.clone(),
                target,
                auth_required: route.auth_required,
            }));
        }

        // Stable sort keeps config order among equally specific prefixes.
        compiled.sort_by(|a, b| b.matcher.specificity().cmp(&a.matcher.specificity()));

        tracing::debug!(routes = compiled.len(), "Route table compiled");
        Ok(Self { routes: compiled })
    }

    /// Find the most specific route for `path`.
    pub fn match_path(&self, path: &str) -> Option<Arc<RouteEntry>> {
        self.routes.iter().find(|r| r.matcher.matches(path)).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
