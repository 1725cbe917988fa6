//! Bearer-token authentication scoping every private route to one tailor.
//!
//! The identity provider itself is an external concern; this module only
//! issues and verifies the JWTs that carry the tailor id. Registration hands
//! out the first token, every authenticated request presents it back.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

const TOKEN_ISSUER: &str = "tailorbook-api";

#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    ttl_seconds: usize,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, ttl_seconds: usize) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Tailor id
    pub sub: String,
    pub iss: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Issues a bearer token for the given tailor.
    pub fn issue_token(&self, tailor_id: Uuid) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: tailor_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now,
            exp: now + self.config.ttl_seconds,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::AuthError(format!("Failed to sign token: {e}")))
    }

    /// Verifies a bearer token and returns the tailor id it carries.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, ServiceError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ServiceError::Unauthorized(format!("Invalid token: {e}")))?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Malformed token subject".to_string()))
    }
}

/// Extractor for authenticated routes. Reads the `Authorization: Bearer`
/// header and resolves it against the `AuthService` injected into request
/// extensions by the auth middleware.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub tailor_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .extensions
            .get::<Arc<AuthService>>()
            .cloned()
            .ok_or_else(|| ServiceError::InternalError("AuthService not injected".to_string()))?;

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("Expected Bearer token".to_string()))?;

        let tailor_id = auth.verify_token(token)?;
        Ok(AuthUser { tailor_id })
    }
}
