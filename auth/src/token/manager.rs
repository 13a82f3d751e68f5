use std::sync::Arc;

use super::authorities::AuthorityExtractor;
use super::issuer::TokenIssuer;
use super::issuer::TokenPolicy;
use super::models::Principal;
use super::models::TokenClass;
use super::models::TokenPair;
use super::validator::TokenValidator;
use crate::clock::SystemTimeProvider;
use crate::clock::TimeProvider;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SigningKey;
use crate::jwt::TokenClaims;

/// Token lifecycle coordinator.
///
/// Composes the issuer, validator and extractor over one signing key,
/// one expiration policy and one time source. Every operation is a pure
/// function of its inputs, the key and the clock, so a single instance is
/// shared behind an `Arc` across request handlers.
#[derive(Clone)]
pub struct TokenManager {
    issuer: TokenIssuer,
    validator: TokenValidator,
    extractor: AuthorityExtractor,
}

impl TokenManager {
    /// Create a token manager on the wall clock.
    ///
    /// # Arguments
    /// * `key` - Signing key derived at startup
    /// * `policy` - Access and refresh TTLs
    ///
    /// # Returns
    /// Configured TokenManager instance
    pub fn new(key: Arc<SigningKey>, policy: TokenPolicy) -> Self {
        Self::with_time_provider(key, policy, Arc::new(SystemTimeProvider))
    }

    /// Create a token manager reading time from `clock`.
    pub fn with_time_provider(
        key: Arc<SigningKey>,
        policy: TokenPolicy,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        let codec = JwtHandler::new(key);
        Self {
            issuer: TokenIssuer::new(codec.clone(), policy, Arc::clone(&clock)),
            validator: TokenValidator::new(codec.clone(), clock),
            extractor: AuthorityExtractor::new(codec),
        }
    }

    /// Issue a single token of `class`.
    pub fn issue(&self, principal: &Principal, class: TokenClass) -> Result<String, JwtError> {
        self.issuer.issue(principal, class)
    }

    /// Issue an access and a refresh token for `principal`.
    ///
    /// # Errors
    /// * `MissingClaim` - Principal subject is blank
    /// * `EncodingFailed` - Signing failed
    pub fn issue_pair(&self, principal: &Principal) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issuer.issue(principal, TokenClass::Access)?,
            refresh_token: self.issuer.issue(principal, TokenClass::Refresh)?,
        })
    }

    pub fn validate(&self, token: &str) -> Result<TokenClaims, JwtError> {
        self.validator.validate(token)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.validator.is_valid(token)
    }

    pub fn is_valid_for(&self, token: &str, expected_subject: &str) -> bool {
        self.validator.is_valid_for(token, expected_subject)
    }

    pub fn extract_username(&self, token: &str) -> Result<String, JwtError> {
        self.extractor.extract_username(token)
    }

    pub fn extract_authorities(&self, token: &str) -> Result<Vec<String>, JwtError> {
        self.extractor.extract_authorities(token)
    }

    pub fn policy(&self) -> &TokenPolicy {
        self.issuer.policy()
    }
}
