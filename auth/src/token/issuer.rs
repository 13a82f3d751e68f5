use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;

use super::models::Principal;
use super::models::TokenClass;
use crate::clock::TimeProvider;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenClaims;

/// Error for invalid expiration policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("{class} token expiration must be at least one second, got {millis} ms")]
    TooShort { class: TokenClass, millis: i64 },
}

/// Time-to-live per token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenPolicy {
    /// Create a policy from explicit durations.
    ///
    /// Tokens carry second-precision timestamps, so each TTL must be at least
    /// one second for `exp` to land strictly after `iat`.
    ///
    /// # Errors
    /// * `TooShort` - A TTL is below one second
    pub fn new(access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, PolicyError> {
        Self::check(TokenClass::Access, access_ttl)?;
        Self::check(TokenClass::Refresh, refresh_ttl)?;
        Ok(Self {
            access_ttl,
            refresh_ttl,
        })
    }

    /// Create a policy from millisecond TTLs as found in configuration.
    pub fn from_millis(access_ms: i64, refresh_ms: i64) -> Result<Self, PolicyError> {
        Self::new(
            Duration::milliseconds(access_ms),
            Duration::milliseconds(refresh_ms),
        )
    }

    fn check(class: TokenClass, ttl: Duration) -> Result<(), PolicyError> {
        if ttl < Duration::seconds(1) {
            Err(PolicyError::TooShort {
                class,
                millis: ttl.num_milliseconds(),
            })
        } else {
            Ok(())
        }
    }

    /// TTL applied to tokens of `class`.
    pub fn ttl(&self, class: TokenClass) -> Duration {
        match class {
            TokenClass::Access => self.access_ttl,
            TokenClass::Refresh => self.refresh_ttl,
        }
    }
}

/// Mints signed tokens for a principal.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: JwtHandler,
    policy: TokenPolicy,
    clock: Arc<dyn TimeProvider>,
}

impl TokenIssuer {
    pub fn new(codec: JwtHandler, policy: TokenPolicy, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            codec,
            policy,
            clock,
        }
    }

    /// Issue a token of `class` for `principal`.
    ///
    /// Authorities are embedded exactly as given; prefix normalization only
    /// happens on extraction.
    ///
    /// # Arguments
    /// * `principal` - Subject and authorities to embed
    /// * `class` - Access or refresh, selects the TTL
    ///
    /// # Returns
    /// Signed compact token
    ///
    /// # Errors
    /// * `MissingClaim` - Principal subject is blank
    /// * `EncodingFailed` - Signing failed
    pub fn issue(&self, principal: &Principal, class: TokenClass) -> Result<String, JwtError> {
        if principal.subject.trim().is_empty() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }

        let issued_at = self.clock.now();
        let expires_at = issued_at
            .checked_add_signed(self.policy.ttl(class))
            .ok_or_else(|| JwtError::EncodingFailed(format!("{} expiration overflows", class)))?;

        let claims = TokenClaims::new(
            &principal.subject,
            principal.authorities.clone(),
            issued_at.timestamp(),
            expires_at.timestamp(),
        );

        self.codec.encode(&claims)
    }

    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedTimeProvider;
    use crate::jwt::SigningKey;

    const NOW: i64 = 1_700_000_000;

    fn codec() -> JwtHandler {
        JwtHandler::new(Arc::new(SigningKey::from_bytes(&[9u8; 32]).unwrap()))
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            codec(),
            TokenPolicy::from_millis(900_000, 604_800_000).unwrap(),
            Arc::new(FixedTimeProvider::at(NOW)),
        )
    }

    #[test]
    fn test_policy_rejects_sub_second_ttl() {
        assert_eq!(
            TokenPolicy::from_millis(999, 60_000).unwrap_err(),
            PolicyError::TooShort {
                class: TokenClass::Access,
                millis: 999
            }
        );
        assert!(matches!(
            TokenPolicy::from_millis(60_000, 0),
            Err(PolicyError::TooShort {
                class: TokenClass::Refresh,
                ..
            })
        ));
        assert!(TokenPolicy::from_millis(60_000, -5).is_err());
    }

    #[test]
    fn test_issue_access_token_claims() {
        let principal = Principal::new("a@x.com", ["USER", "ROLE_ADMIN"]);
        let token = issuer().issue(&principal, TokenClass::Access).unwrap();

        let claims: TokenClaims = codec().decode(&token).unwrap();
        assert_eq!(claims.subject(), Some("a@x.com"));
        assert_eq!(
            claims.authorities,
            vec!["USER".to_string(), "ROLE_ADMIN".to_string()]
        );
        assert_eq!(claims.iat, Some(NOW));
        assert_eq!(claims.exp, Some(NOW + 900));
    }

    #[test]
    fn test_issue_refresh_token_uses_refresh_ttl() {
        let principal = Principal::new("a@x.com", Vec::<String>::new());
        let token = issuer().issue(&principal, TokenClass::Refresh).unwrap();

        let claims: TokenClaims = codec().decode(&token).unwrap();
        assert_eq!(claims.exp, Some(NOW + 604_800));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_issue_blank_subject() {
        let principal = Principal::new("  ", ["USER"]);
        let result = issuer().issue(&principal, TokenClass::Access);
        assert_eq!(result.unwrap_err(), JwtError::MissingClaim("sub".to_string()));
    }
}
