//! Bearer credential verification.
//!
//! # Responsibilities
//! - Extract the bearer token from `Authorization`
//! - Verify it in exactly one mode: shared secret (HS*) or RSA public key (RS*)
//! - Attach an [`Identity`] to the request, or reject with `AUTH_ERROR`
//!
//! # Design Decisions
//! - A presented credential is always verified, even on public routes
//! - Credential-less requests are anonymous unless the route requires auth
//!   and enforcement is on
//! - There is no decode-without-verify path

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::error::GatewayError;
use crate::http::context::MatchedRoute;

/// Verifier construction failures. All are fatal at startup.
#[derive(Debug, Error)]
pub enum AuthSetupError {
    #[error("no verification mode configured: set JWT_SECRET or JWT_PUBLIC_KEY")]
    NoVerificationMode,

    #[error("both JWT_SECRET and JWT_PUBLIC_KEY are set; configure exactly one")]
    ConflictingModes,

    #[error("failed to parse JWT_PUBLIC_KEY as RSA PEM: {0}")]
    InvalidPublicKey(#[source] jsonwebtoken::errors::Error),
}

/// Claims the upstream services care about.
///
/// The user service has issued tokens carrying the subject as `sub`, `userId`
/// or `id`, sometimes numeric, so all three are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    pub exp: i64,
}

impl Claims {
    /// Subject identifier: `sub`, then `userId`, then `id`.
    pub fn subject(&self) -> Option<String> {
        self.sub
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| self.user_id.as_ref().and_then(scalar_to_string))
            .or_else(|| self.id.as_ref().and_then(scalar_to_string))
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Who the gateway believes is calling.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Verified(Claims),
    Anonymous,
}

impl Identity {
    pub fn subject(&self) -> Option<String> {
        match self {
            Identity::Verified(claims) => claims.subject(),
            Identity::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<&str> {
        match self {
            Identity::Verified(claims) => claims.role.as_deref(),
            Identity::Anonymous => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}

/// Validates bearer tokens against the configured key.
pub struct AuthVerifier {
    key: DecodingKey,
    validation: Validation,
    enforce: bool,
}

impl std::fmt::Debug for AuthVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("enforce", &self.enforce)
            .finish_non_exhaustive()
    }
}

impl AuthVerifier {
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthSetupError> {
        let secret = config.jwt_secret.as_deref().filter(|s| !s.trim().is_empty());
        let public_key = config
            .jwt_public_key
            .as_deref()
            .filter(|s| !s.trim().is_empty());

        let (key, algorithms) = match (secret, public_key) {
            (Some(_), Some(_)) => return Err(AuthSetupError::ConflictingModes),
            (None, None) => return Err(AuthSetupError::NoVerificationMode),
            (Some(secret), None) => {
                tracing::info!("JWT verification using shared secret (HS256/HS384/HS512)");
                (
                    DecodingKey::from_secret(secret.as_bytes()),
                    vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512],
                )
            }
            (None, Some(pem)) => {
                // Keys passed through the environment usually carry escaped newlines.
                let pem = pem.replace("\\n", "\n");
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(AuthSetupError::InvalidPublicKey)?;
                tracing::info!("JWT verification using RSA public key (RS256/RS384/RS512)");
                (key, vec![Algorithm::RS256, Algorithm::RS384, Algorithm::RS512])
            }
        };

        let mut validation = Validation::new(algorithms[0]);
        validation.algorithms = algorithms;
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key,
            validation,
            enforce: config.enforce,
        })
    }

    pub fn enforce(&self) -> bool {
        self.enforce
    }

    /// Verify signature, expiry and configured claim checks.
    pub fn verify(&self, token: &str) -> Result<Claims, GatewayError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token verification failed");
                let message = match e.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidSignature => "Invalid token signature",
                    ErrorKind::InvalidAlgorithm => "Token algorithm not accepted",
                    ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                        "Token not issued for this gateway"
                    }
                    _ => "Invalid token",
                };
                GatewayError::auth(message)
            })
    }

    /// Resolve the identity for a request.
    ///
    /// `auth_required` is the matched route's flag.
    pub fn authenticate(
        &self,
        headers: &HeaderMap,
        auth_required: bool,
    ) -> Result<Identity, GatewayError> {
        match bearer_token(headers)? {
            Some(token) => self.verify(token).map(Identity::Verified),
            None if auth_required && self.enforce => {
                Err(GatewayError::auth("Authentication required"))
            }
            None => Ok(Identity::Anonymous),
        }
    }
}

/// The bearer token, if an `Authorization` header is present.
///
/// A header that is present but not a bearer credential is an error rather
/// than anonymity.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, GatewayError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| GatewayError::auth("Malformed authorization header"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| GatewayError::auth("Malformed authorization header"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(GatewayError::auth("Malformed authorization header"));
    }
    Ok(Some(token))
}

pub async fn auth_middleware(
    State(verifier): State<Arc<AuthVerifier>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_required = request
        .extensions()
        .get::<MatchedRoute>()
        .map(|route| route.0.auth_required)
        .unwrap_or(true);

    match verifier.authenticate(request.headers(), auth_required) {
        Ok(identity) => {
            if let Some(subject) = identity.subject() {
                tracing::debug!(subject = %subject, "Request authenticated");
            }
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
