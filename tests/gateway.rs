//! End-to-end tests: real listener, real upstream sockets.

use std::time::Duration;

use edge_gateway::config::RateLimitPolicyConfig;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{
    spawn_gateway, start_mock_backend, start_programmable_backend, test_config, token,
    token_without_subject, MockResponse,
};

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

fn api_policy(window_ms: u64, max_requests: u32) -> RateLimitPolicyConfig {
    RateLimitPolicyConfig {
        name: "api".into(),
        window_ms,
        max_requests,
        path_prefixes: vec!["/api/".into()],
        key: Default::default(),
        message: "API rate limit exceeded. Please slow down.".into(),
    }
}

#[tokio::test]
async fn health_is_served_outside_the_chain() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;

    let res = gateway.client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-gateway"], "edge-gateway");
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "UP");
    assert!(body["timestamp"].is_string());
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn protected_route_without_token_is_rejected() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;

    let res = gateway
        .client
        .get(gateway.url("/api/v1/users/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "AUTH_ERROR");
    assert_eq!(body["message"], "Authentication required");
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn verified_identity_is_forwarded_upstream() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;

    let res = gateway
        .client
        .get(gateway.url("/api/v1/users/me?fields=name"))
        .header(AUTHORIZATION, bearer(&token("42", "admin")))
        .header("x-request-id", "corr-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "corr-123");

    let seen = backend.last();
    assert_eq!(seen.path, "/api/users/me?fields=name");
    assert_eq!(seen.header("x-user-id"), Some("42"));
    assert_eq!(seen.header("x-user-role"), Some("admin"));
    assert_eq!(seen.header("x-request-id"), Some("corr-123"));
    assert_eq!(seen.header("x-forwarded-for"), Some("127.0.0.1"));
    assert_eq!(seen.header("host"), Some(backend.addr.to_string().as_str()));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;
    let expired = common::token_with_exp("42", "user", chrono::Utc::now().timestamp() - 600);

    let res = gateway
        .client
        .get(gateway.url("/api/v1/content/articles"))
        .header(AUTHORIZATION, bearer(&expired))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Token expired");
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn public_route_drops_spoofed_identity_headers() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;

    let res = gateway
        .client
        .get(gateway.url("/api/v1/users/auth/session"))
        .header("x-user-id", "999")
        .header("x-user-role", "admin")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let seen = backend.last();
    assert_eq!(seen.path, "/api/users/auth/session");
    assert_eq!(seen.header("x-user-id"), None);
    assert_eq!(seen.header("x-user-role"), None);
}

#[tokio::test]
async fn invalid_token_is_rejected_even_on_public_routes() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;

    let res = gateway
        .client
        .get(gateway.url("/api/v1/users/auth/session"))
        .header(AUTHORIZATION, "Bearer not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn unknown_path_is_route_not_found() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;

    let res = gateway.client.get(gateway.url("/nowhere")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn denylisted_client_is_forbidden() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    config.security.denylist = vec!["127.0.0.1".parse().unwrap()];
    let gateway = spawn_gateway(config).await;

    let res = gateway
        .client
        .get(gateway.url("/api/v1/users/auth/session"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "FORBIDDEN");
    assert_eq!(backend.hits(), 0);

    let res = gateway.client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn denylisted_client_cannot_reach_admin_api() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    config.security.denylist = vec!["127.0.0.1".parse().unwrap()];
    let gateway = spawn_gateway(config).await;

    let res = gateway
        .client
        .get(gateway.url("/admin/status"))
        .header(AUTHORIZATION, bearer(common::ADMIN_KEY))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn forwarded_address_from_trusted_proxy_is_denylisted() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    config.security.trusted_proxies = vec!["127.0.0.1".parse().unwrap()];
    config.security.denylist = vec!["203.0.113.9".parse().unwrap()];
    let gateway = spawn_gateway(config).await;

    let blocked = gateway
        .client
        .get(gateway.url("/api/v1/users/auth/session"))
        .header("x-forwarded-for", "1.2.3.4, 203.0.113.9")
        .send()
        .await
        .unwrap();
    assert_eq!(blocked.status(), StatusCode::FORBIDDEN);

    let allowed = gateway
        .client
        .get(gateway.url("/api/v1/users/auth/session"))
        .header("x-forwarded-for", "198.51.100.7")
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    assert_eq!(backend.hits(), 1);
    assert_eq!(
        backend.last().header("x-forwarded-for"),
        Some("198.51.100.7, 127.0.0.1")
    );
}

#[tokio::test]
async fn forged_forwarded_entries_do_not_reset_rate_limit() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    config.cache.enabled = false;
    config.security.trusted_proxies = vec!["127.0.0.1".parse().unwrap()];
    config.rate_limit.enabled = true;
    config.rate_limit.policies = vec![api_policy(60_000, 1)];
    let gateway = spawn_gateway(config).await;
    let url = gateway.url("/api/v1/users/auth/session");

    let first = gateway
        .client
        .get(&url)
        .header("x-forwarded-for", "9.9.9.1, 198.51.100.7")
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = gateway
        .client
        .get(&url)
        .header("x-forwarded-for", "9.9.9.2, 198.51.100.7")
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn rate_limit_admits_exactly_max_requests() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    config.cache.enabled = false;
    config.rate_limit.enabled = true;
    config.rate_limit.policies = vec![api_policy(60_000, 3)];
    let gateway = spawn_gateway(config).await;
    let url = gateway.url("/api/v1/users/auth/session");

    for remaining in ["2", "1", "0"] {
        let res = gateway.client.get(&url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-ratelimit-limit"], "3");
        assert_eq!(res.headers()["x-ratelimit-remaining"], remaining);
        assert!(res.headers().contains_key("x-ratelimit-reset"));
    }

    let res = gateway.client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers()["retry-after"], "60");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "TOO_MANY_REQUESTS");
    assert_eq!(body["message"], "API rate limit exceeded. Please slow down.");
    assert_eq!(body["retryAfter"], 60);
    assert_eq!(backend.hits(), 3);
}

#[tokio::test]
async fn rate_limit_reset_tracks_the_oldest_request() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    config.cache.enabled = false;
    config.rate_limit.enabled = true;
    config.rate_limit.policies = vec![api_policy(60_000, 2)];
    let gateway = spawn_gateway(config).await;
    let url = gateway.url("/api/v1/users/auth/session");

    let reset = |res: &reqwest::Response| -> i64 {
        res.headers()["x-ratelimit-reset"].to_str().unwrap().parse().unwrap()
    };

    let first = gateway.client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first_reset = reset(&first);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let second = gateway.client.get(&url).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert!((reset(&second) - first_reset).abs() < 250);

    let rejected = gateway.client.get(&url).send().await.unwrap();
    assert_eq!(rejected.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!((reset(&rejected) - first_reset).abs() < 250);
    assert_eq!(rejected.headers()["retry-after"], "60");
}

#[tokio::test]
async fn rate_limit_recovers_after_window() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    config.cache.enabled = false;
    config.rate_limit.enabled = true;
    config.rate_limit.policies = vec![api_policy(300, 1)];
    let gateway = spawn_gateway(config).await;
    let url = gateway.url("/api/v1/users/auth/session");

    assert_eq!(gateway.client.get(&url).send().await.unwrap().status(), StatusCode::OK);
    assert_eq!(
        gateway.client.get(&url).send().await.unwrap().status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(gateway.client.get(&url).send().await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn repeated_get_is_served_from_cache() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;
    let auth = bearer(&token("7", "user"));
    let url = gateway.url("/api/v1/content/articles?page=1");

    let first = gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["x-cache"], "MISS");
    let first_body: Value = first.json().await.unwrap();

    let second = gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["x-cache"], "HIT");
    assert_eq!(second.headers()["x-gateway"], "edge-gateway");
    let second_body: Value = second.json().await.unwrap();

    assert_eq!(first_body, second_body);
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn cache_is_scoped_per_subject() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;
    let url = gateway.url("/api/v1/content/articles");

    for sub in ["alice", "bob"] {
        let res = gateway
            .client
            .get(&url)
            .header(AUTHORIZATION, bearer(&token(sub, "user")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.headers()["x-cache"], "MISS");
    }
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn subject_named_anonymous_does_not_share_the_anonymous_entry() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;
    let url = gateway.url("/api/v1/test-user");

    let res = gateway.client.get(&url).send().await.unwrap();
    assert_eq!(res.headers()["x-cache"], "MISS");

    let res = gateway
        .client
        .get(&url)
        .header(AUTHORIZATION, bearer(&token("anonymous", "user")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-cache"], "MISS");
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn verified_caller_without_subject_is_never_cached() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;
    let url = gateway.url("/api/v1/content/articles");
    let auth = bearer(&token_without_subject("user"));

    for _ in 0..2 {
        let res = gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(!res.headers().contains_key("x-cache"));
    }
    assert_eq!(backend.hits(), 2);

    let res = gateway
        .client
        .get(gateway.url("/admin/cache"))
        .header(AUTHORIZATION, bearer(common::ADMIN_KEY))
        .send()
        .await
        .unwrap();
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["cache"]["size"], 0);
}

#[tokio::test]
async fn versioned_hosts_do_not_share_cache_entries() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;
    let url = gateway.url("/api/v1/content/articles");
    let auth = bearer(&token("7", "user"));

    let res = gateway
        .client
        .get(&url)
        .header(AUTHORIZATION, &auth)
        .header(HOST, "v2.api.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-cache"], "MISS");

    let res = gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
    assert_eq!(res.headers()["x-cache"], "MISS");

    let res = gateway
        .client
        .get(&url)
        .header(AUTHORIZATION, &auth)
        .header(HOST, "v2.api.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-cache"], "HIT");

    let paths: Vec<String> = backend.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, ["/api/v2/content/articles", "/api/content/articles"]);
}

#[tokio::test]
async fn cached_entry_expires_after_ttl() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    config.cache.default_ttl_secs = 1;
    config.cache.ttl_rules.clear();
    let gateway = spawn_gateway(config).await;
    let auth = bearer(&token("7", "user"));
    let url = gateway.url("/api/v1/content/articles");

    let res = gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
    assert_eq!(res.headers()["x-cache"], "MISS");

    tokio::time::sleep(Duration::from_millis(1200)).await;

    let res = gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
    assert_eq!(res.headers()["x-cache"], "MISS");
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn mutation_invalidates_related_entries() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;
    let auth = bearer(&token("7", "user"));
    let url = gateway.url("/api/v1/gamification/missions");

    gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
    let hit = gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
    assert_eq!(hit.headers()["x-cache"], "HIT");

    let res = gateway
        .client
        .post(gateway.url("/api/v1/gamification/missions/3/complete"))
        .header(AUTHORIZATION, &auth)
        .json(&json!({ "progress": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let after = gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
    assert_eq!(after.headers()["x-cache"], "MISS");
    assert_eq!(backend.hits(), 3);
}

#[tokio::test]
async fn upstream_errors_are_not_cached() {
    let backend = start_programmable_backend(|_| {
        MockResponse::json(500, json!({ "message": "boom" }))
    })
    .await;
    let gateway = spawn_gateway(test_config(&backend)).await;
    let auth = bearer(&token("7", "user"));
    let url = gateway.url("/api/v1/content/articles");

    for _ in 0..2 {
        let res = gateway.client.get(&url).header(AUTHORIZATION, &auth).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn internal_fields_and_headers_are_stripped() {
    let backend = start_programmable_backend(|_| {
        MockResponse::json(
            200,
            json!({
                "id": 1,
                "internal": { "shard": 4 },
                "profile": { "name": "Ada", "secret": "s3cr3t" },
                "items": [{ "secret": 1, "kept": true }]
            }),
        )
        .with_header("Server", "upstream/1.0")
        .with_header("X-Powered-By", "Express")
    })
    .await;
    let gateway = spawn_gateway(test_config(&backend)).await;

    let res = gateway
        .client
        .get(gateway.url("/api/v1/users/auth/session"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.headers().contains_key("server"));
    assert!(!res.headers().contains_key("x-powered-by"));
    assert_eq!(res.headers()["x-gateway"], "edge-gateway");

    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "id": 1, "profile": { "name": "Ada" }, "items": [{ "kept": true }] })
    );
}

#[tokio::test]
async fn versioned_host_selects_upstream_path_space() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;

    let res = gateway
        .client
        .get(gateway.url("/api/v1/users/auth/session"))
        .header(HOST, "v2.api.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let seen = backend.last();
    assert_eq!(seen.path, "/api/v2/users/auth/session");
    assert_eq!(seen.header("x-forwarded-host"), Some("v2.api.example.com"));
}

#[tokio::test]
async fn legacy_request_fields_are_renamed() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;

    let res = gateway
        .client
        .post(gateway.url("/api/v1/users/auth/login"))
        .json(&json!({ "uid": 7, "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let seen = backend.last();
    assert_eq!(seen.method, "POST");
    let forwarded: Value = serde_json::from_slice(&seen.body).unwrap();
    assert_eq!(forwarded, json!({ "userId": 7, "password": "pw" }));
    assert_eq!(
        seen.header("content-length"),
        Some(seen.body.len().to_string().as_str())
    );
}

#[tokio::test]
async fn mutation_bodies_are_validated() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    config.security.max_body_size = 64;
    let gateway = spawn_gateway(config).await;
    let url = gateway.url("/api/v1/users/auth/login");

    let res = gateway
        .client
        .post(&url)
        .header(CONTENT_TYPE, "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "INVALID_CONTENT_TYPE");

    let res = gateway
        .client
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "INVALID_JSON");

    let res = gateway
        .client
        .post(&url)
        .json(&json!({ "padding": "x".repeat(200) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn unreachable_service_is_service_unavailable() {
    let backend = start_mock_backend().await;
    let mut config = test_config(&backend);
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);
    config.services.insert("user".into(), dead);
    let gateway = spawn_gateway(config).await;

    let res = gateway
        .client
        .get(gateway.url("/api/v1/users/auth/session"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn admin_api_manages_cache() {
    let backend = start_mock_backend().await;
    let gateway = spawn_gateway(test_config(&backend)).await;
    let admin = bearer(common::ADMIN_KEY);

    let res = gateway.client.get(gateway.url("/admin/cache")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    gateway
        .client
        .get(gateway.url("/api/v1/content/articles"))
        .header(AUTHORIZATION, bearer(&token("7", "user")))
        .send()
        .await
        .unwrap();

    let res = gateway
        .client
        .get(gateway.url("/admin/cache"))
        .header(AUTHORIZATION, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["cache"]["size"], 1);

    let res = gateway
        .client
        .post(gateway.url("/admin/cache/clear"))
        .header(AUTHORIZATION, &admin)
        .send()
        .await
        .unwrap();
    let cleared: Value = res.json().await.unwrap();
    assert_eq!(cleared["keysCleared"], 1);

    let res = gateway
        .client
        .get(gateway.url("/admin/status"))
        .header(AUTHORIZATION, &admin)
        .send()
        .await
        .unwrap();
    let status: Value = res.json().await.unwrap();
    assert_eq!(status["status"], "operational");
    assert_eq!(status["routes"], 7);
    assert_eq!(status["cacheEntries"], 0);
}
