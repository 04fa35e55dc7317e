//! Operator Authentication
//!
//! Privileged routes authenticate the operator with an
//! `Authorization: Bearer <token>` header. Configuration only holds the
//! SHA-256 hash of the token, and the caller of a privileged route is always
//! resolved from that credential, never from the request body.

use super::{errors::ApiError, handlers::AppState, middleware::request_id_of};
use crate::config::ApiConfig;
use crate::errors::{ConfigurationError, GameError};
use crate::games::types::AccountId;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller reported for requests without a valid operator credential
pub const ANONYMOUS_CALLER: &str = "anonymous";

/// Hex SHA-256 of a raw token, the form kept in configuration
pub fn hash_api_key(raw_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `value` has the shape of a `hash_api_key` output
pub fn is_token_hash(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// The operator's credential
#[derive(Clone)]
pub struct OperatorAuth {
    token_hash: String,
}

impl OperatorAuth {
    pub fn new(token_hash: impl Into<String>) -> Self {
        Self {
            token_hash: token_hash.into().trim().to_ascii_lowercase(),
        }
    }

    pub fn from_token(raw_token: &str) -> Self {
        Self::new(hash_api_key(raw_token))
    }

    /// Fails when no credential is configured; the API does not start without one
    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigurationError> {
        config
            .operator_token_hash
            .as_deref()
            .map(Self::new)
            .ok_or_else(|| ConfigurationError::MissingRequired("api.operator_token_hash".to_string()))
    }

    pub fn validate_api_key(&self, raw_key: &str) -> bool {
        constant_time_eq(hash_api_key(raw_key).as_bytes(), self.token_hash.as_bytes())
    }
}

impl std::fmt::Debug for OperatorAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorAuth").finish_non_exhaustive()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// The casino operator, authenticated by bearer token
#[derive(Debug, Clone)]
pub struct OperatorCaller(pub AccountId);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OperatorCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            Some(token) if state.operator_auth.validate_api_key(token) => {
                debug!(path = %parts.uri.path(), "Operator authenticated");
                Ok(Self(state.casino.operator().clone()))
            }
            presented => {
                warn!(
                    path = %parts.uri.path(),
                    credential_presented = presented.is_some(),
                    "Rejected operator request"
                );
                Err(ApiError::game(
                    request_id_of(&parts.extensions),
                    GameError::Unauthorized {
                        caller: AccountId::new(ANONYMOUS_CALLER),
                    },
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_api_key() {
        let hash = hash_api_key("secret");
        assert!(is_token_hash(&hash));
        assert_eq!(hash, hash_api_key("secret"));
        assert_ne!(hash, hash_api_key("Secret"));
        assert!(!is_token_hash("secret"));
    }

    #[test]
    fn test_validate_api_key() {
        let auth = OperatorAuth::new(hash_api_key("secret").to_uppercase());
        assert!(auth.validate_api_key("secret"));
        assert!(!auth.validate_api_key("secre"));
        assert!(!auth.validate_api_key(""));
    }

    #[test]
    fn test_missing_credential_is_a_configuration_error() {
        let mut config = ApiConfig::default();
        assert!(matches!(
            OperatorAuth::from_config(&config),
            Err(ConfigurationError::MissingRequired(field)) if field == "api.operator_token_hash"
        ));

        config.operator_token_hash = Some(hash_api_key("secret"));
        assert!(OperatorAuth::from_config(&config).unwrap().validate_api_key("secret"));
    }
}
