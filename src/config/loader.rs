//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    Env { var: String, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: TOML file (if any), then environment overrides, then
/// semantic validation.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment-level settings onto `config`.
///
/// `lookup` resolves a variable name; empty values count as unset.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(addr) = get("GATEWAY_BIND_ADDRESS") {
        config.listener.bind_address = addr;
    } else if let Some(port) = get("PORT") {
        let port: u16 = parse_var("PORT", &port)?;
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }

    if let Some(secret) = get("JWT_SECRET") {
        config.auth.jwt_secret = Some(secret);
    }
    if let Some(key) = get("JWT_PUBLIC_KEY") {
        config.auth.jwt_public_key = Some(key);
    }
    if let Some(enforce) = get("ENFORCE_JWT") {
        config.auth.enforce = parse_var("ENFORCE_JWT", &enforce)?;
    }

    if let Some(list) = get("IP_BLACKLIST") {
        config.security.denylist = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_var("IP_BLACKLIST", s))
            .collect::<Result<_, _>>()?;
    }

    for (name, url) in config.services.iter_mut() {
        let var = format!("{}_SERVICE_URL", env_name(name));
        if let Some(value) = get(&var) {
            *url = value;
        }
    }

    for policy in config.rate_limit.policies.iter_mut() {
        // The general API policy keeps the unprefixed variable names.
        let prefix = if policy.name == "api" {
            "RATE_LIMIT".to_string()
        } else {
            format!("{}_RATE_LIMIT", env_name(&policy.name))
        };

        let window_var = format!("{}_WINDOW_MS", prefix);
        if let Some(value) = get(&window_var) {
            policy.window_ms = parse_var(&window_var, &value)?;
        }
        let max_var = format!("{}_MAX", prefix);
        if let Some(value) = get(&max_var) {
            policy.max_requests = parse_var(&max_var, &value)?;
        }
    }

    let slow_down = &mut config.rate_limit.slow_down;
    if let Some(value) = get("SLOW_DOWN_WINDOW_MS") {
        slow_down.window_ms = parse_var("SLOW_DOWN_WINDOW_MS", &value)?;
    }
    if let Some(value) = get("SLOW_DOWN_DELAY_AFTER") {
        slow_down.delay_after = parse_var("SLOW_DOWN_DELAY_AFTER", &value)?;
    }
    if let Some(value) = get("SLOW_DOWN_DELAY_MS") {
        slow_down.delay_ms = parse_var("SLOW_DOWN_DELAY_MS", &value)?;
    }

    if let Some(value) = get("CACHE_TTL_SECS") {
        config.cache.default_ttl_secs = parse_var("CACHE_TTL_SECS", &value)?;
    }

    if let Some(key) = get("GATEWAY_ADMIN_API_KEY") {
        config.admin.enabled = true;
        config.admin.api_key = key;
    }

    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    Ok(())
}

fn env_name(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}

fn parse_var<T: FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var: var.to_string(),
        value: value.to_string(),
    })
}
