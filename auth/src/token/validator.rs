use std::sync::Arc;

use crate::clock::TimeProvider;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenClaims;

/// Checks signature, subject and expiry of presented tokens.
#[derive(Clone)]
pub struct TokenValidator {
    codec: JwtHandler,
    clock: Arc<dyn TimeProvider>,
}

impl TokenValidator {
    pub fn new(codec: JwtHandler, clock: Arc<dyn TimeProvider>) -> Self {
        Self { codec, clock }
    }

    /// Decode a token and check it is usable right now.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    ///
    /// # Returns
    /// Verified claims with a non-blank subject and a future `exp`
    ///
    /// # Errors
    /// * `InvalidSignature` / `Malformed` / `UnsupportedAlgorithm` - Decoding failed
    /// * `MissingClaim` - Subject blank or `exp` absent
    /// * `TokenExpired` - `exp` is at or before the current time
    pub fn validate(&self, token: &str) -> Result<TokenClaims, JwtError> {
        let claims: TokenClaims = self.codec.decode(token)?;

        if claims.subject().is_none() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }
        if claims.exp.is_none() {
            return Err(JwtError::MissingClaim("exp".to_string()));
        }
        if claims.is_expired(self.clock.unix_timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }

    /// Fail-closed validity check: any decode or claim problem is `false`.
    pub fn is_valid(&self, token: &str) -> bool {
        self.validate(token).is_ok()
    }

    /// Validity check bound to an expected principal identifier.
    pub fn is_valid_for(&self, token: &str, expected_subject: &str) -> bool {
        self.validate(token)
            .map(|claims| claims.subject() == Some(expected_subject))
            .unwrap_or(false)
    }
}
