//! JWT validation for identity-provider tokens.
//!
//! Identity and credential management live in an external provider; it
//! issues signed tokens whose claims carry the actor facts the core needs
//! (tiers, department, role flags). This module validates those tokens and
//! can mint them for tests and tooling.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Department, Tier};

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key shared with the identity provider.
    pub secret: String,
    /// Token lifetime in minutes (used when minting).
    pub expires_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expires_minutes: 60,
        }
    }
}

/// Token claims: the actor facts supplied by the identity provider.
///
/// The core never inspects ambient session state; every call receives
/// these facts explicitly, decoded from the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Actor id (subject).
    pub sub: Uuid,
    /// Display name.
    pub name: String,
    /// Rank the actor approves at.
    pub approval_tier: Tier,
    /// Rank the actor submits at.
    pub application_tier: Tier,
    /// The actor's department.
    pub department: Department,
    /// Manages budgets.
    #[serde(default)]
    pub treasurer: bool,
    /// Handles income contracts.
    #[serde(default)]
    pub representative: bool,
    /// Administrative access.
    #[serde(default)]
    pub admin: bool,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is invalid.
    #[error("invalid token")]
    Invalid,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mints a token carrying the given actor facts.
    ///
    /// Normally the identity provider issues tokens; this is for tests
    /// and admin tooling.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_token(
        &self,
        actor_id: Uuid,
        name: &str,
        approval_tier: Tier,
        application_tier: Tier,
        department: Department,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: actor_id,
            name: name.to_string(),
            approval_tier,
            application_tier,
            department,
            treasurer: false,
            representative: false,
            admin: false,
            exp: (now + Duration::minutes(self.config.expires_minutes)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` for expired tokens and
    /// `JwtError::Invalid` for anything else that fails validation.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expires_minutes: 5,
        })
    }

    #[test]
    fn test_generate_and_validate_roundtrip() {
        let svc = service();
        let actor_id = Uuid::new_v4();
        let token = svc
            .generate_token(
                actor_id,
                "Ada",
                Tier::Committee,
                Tier::Member,
                Department::Arts,
            )
            .expect("token should encode");

        let claims = svc.validate_token(&token).expect("token should validate");
        assert_eq!(claims.sub, actor_id);
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.approval_tier, Tier::Committee);
        assert_eq!(claims.application_tier, Tier::Member);
        assert_eq!(claims.department, Department::Arts);
        assert!(!claims.admin);
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let svc = service();
        assert!(matches!(
            svc.validate_token("not-a-token"),
            Err(JwtError::Invalid)
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let svc = service();
        let other = JwtService::new(JwtConfig {
            secret: "different-secret".to_string(),
            expires_minutes: 5,
        });
        let token = other
            .generate_token(
                Uuid::new_v4(),
                "Eve",
                Tier::Member,
                Tier::Member,
                Department::Sports,
            )
            .expect("token should encode");

        assert!(matches!(svc.validate_token(&token), Err(JwtError::Invalid)));
    }
}
