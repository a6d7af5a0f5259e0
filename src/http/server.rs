//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build every chain component from configuration (fail fast)
//! - Assemble the ordered middleware chain around the proxy handler
//! - Wire outer layers (tracing, correlation id, timeout, headers, metrics)
//! - Serve with graceful shutdown and run background sweepers
//!
//! # Chain
//! ```text
//! TraceLayer → request id → metrics → timeout → security headers → X-Gateway
//!   → denylist → route resolution → auth → rate limit → body limits → cache
//!   → proxy handler
//! ```
//! `/health` and `/admin/*` sit outside the chain.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    http::{HeaderName, HeaderValue},
    middleware::{from_fn, from_fn_with_state},
    routing::{any, get},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::{setup_admin_router, AdminState};
use crate::cache::{cache_middleware, ResponseCache};
use crate::config::{ConfigError, GatewayConfig, validate_config};
use crate::http::health::health_handler;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::observability::metrics::track_requests;
use crate::proxy::response::X_GATEWAY;
use crate::proxy::{proxy_handler, Forwarder, ProxyState, RequestTransformer, ResponseTransformer};
use crate::routing::{resolve_route_middleware, RouteTable, RoutingError, VersionedHostMatcher};
use crate::security::auth::auth_middleware;
use crate::security::denylist::denylist_middleware;
use crate::security::headers::security_headers_middleware;
use crate::security::limits::body_limit_middleware;
use crate::security::rate_limit::rate_limit_middleware;
use crate::security::{AuthSetupError, AuthVerifier, BodyLimits, Denylist, RateLimiter};

/// Anything that prevents the gateway from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("route table error: {0}")]
    Routing(#[from] RoutingError),

    #[error("credential verifier error: {0}")]
    Auth(#[from] AuthSetupError),

    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The assembled gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResponseCache>,
}

impl GatewayServer {
    /// Build every component. Any misconfiguration is reported here, before
    /// a listener is bound.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let routes = Arc::new(RouteTable::from_config(&config.routes, &config.services)?);
        let verifier = Arc::new(AuthVerifier::from_config(&config.auth)?);
        let denylist = Arc::new(Denylist::from_config(&config.security));
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        let limits = Arc::new(BodyLimits::from_config(&config.security));
        let cache = Arc::new(
            ResponseCache::from_config(&config.cache)
                .with_host_versions(VersionedHostMatcher::new(&config.rewrite.host_versions)),
        );
        let responses = Arc::new(ResponseTransformer::from_config(&config.response));

        let proxy = ProxyState {
            requests: Arc::new(RequestTransformer::from_config(&config.rewrite)),
            forwarder: Arc::new(Forwarder::new(
                &config.timeouts,
                config.security.max_response_size,
            )),
            responses: responses.clone(),
        };

        let chain = Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(proxy)
            .layer(
                ServiceBuilder::new()
                    .layer(from_fn_with_state(denylist.clone(), denylist_middleware))
                    .layer(from_fn_with_state(routes.clone(), resolve_route_middleware))
                    .layer(from_fn_with_state(verifier, auth_middleware))
                    .layer(from_fn_with_state(limiter.clone(), rate_limit_middleware))
                    .layer(from_fn_with_state(limits, body_limit_middleware))
                    .layer(from_fn_with_state(cache.clone(), cache_middleware)),
            );

        let mut router = Router::new()
            .route("/health", get(health_handler))
            .merge(chain);

        if config.admin.enabled {
            let admin = setup_admin_router(AdminState {
                api_key: Arc::from(config.admin.api_key.as_str()),
                cache: cache.clone(),
                routes,
                started_at: Instant::now(),
            })
            .layer(from_fn_with_state(denylist, denylist_middleware));
            router = router.merge(admin);
            tracing::info!("Admin API enabled");
        }

        let router = Self::apply_outer_layers(router, &config, responses.gateway_id().clone());

        tracing::info!(
            routes = config.routes.len(),
            services = config.services.len(),
            policies = config.rate_limit.policies.len(),
            cache_enabled = config.cache.enabled,
            "Gateway assembled"
        );

        Ok(Self {
            router,
            config,
            limiter,
            cache,
        })
    }

    /// Layers that wrap everything, including `/health` and `/admin`.
    #[allow(deprecated)]
    fn apply_outer_layers(router: Router, config: &GatewayConfig, gateway_id: HeaderValue) -> Router {
        let router = router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(X_GATEWAY),
            gateway_id,
        ));
        let router = if config.security.enable_headers {
            router.layer(from_fn(security_headers_middleware))
        } else {
            router
        };

        router.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(set_request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(from_fn(track_requests))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// The assembled router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` is triggered, then drain.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway listening");

        let mut sweepers = self.limiter.spawn_sweepers(&shutdown);
        if self.config.cache.enabled {
            sweepers.push(self.cache.spawn_sweeper(&shutdown));
        }

        let mut signal = shutdown.subscribe();
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = signal.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        for sweeper in sweepers {
            let _ = sweeper.await;
        }
        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Parse the configured listener address.
pub fn bind_address(config: &GatewayConfig) -> Result<SocketAddr, StartupError> {
    config
        .listener
        .bind_address
        .parse()
        .map_err(|source| StartupError::Address {
            address: config.listener.bind_address.clone(),
            source,
        })
}
