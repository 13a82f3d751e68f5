use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenClaims;

/// Prefix carried by every enforceable authority.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Prefix `authority` with `ROLE_` unless it already starts with it.
pub fn normalize_authority(authority: &str) -> String {
    if authority.starts_with(ROLE_PREFIX) {
        authority.to_string()
    } else {
        format!("{}{}", ROLE_PREFIX, authority)
    }
}

/// Reads subject and authorities back out of a signed token.
///
/// This is the only place role-prefix normalization is applied.
#[derive(Debug, Clone)]
pub struct AuthorityExtractor {
    codec: JwtHandler,
}

impl AuthorityExtractor {
    pub fn new(codec: JwtHandler) -> Self {
        Self { codec }
    }

    /// Normalized authorities embedded in `token`, in issued order.
    ///
    /// An absent or non-list claim yields an empty list; blank and
    /// non-string entries are skipped.
    ///
    /// # Errors
    /// * `InvalidSignature` / `Malformed` / `UnsupportedAlgorithm` - Token cannot be verified
    pub fn extract_authorities(&self, token: &str) -> Result<Vec<String>, JwtError> {
        let claims: TokenClaims = self.codec.decode(token)?;

        Ok(claims
            .authorities
            .iter()
            .filter(|authority| !authority.trim().is_empty())
            .map(|authority| normalize_authority(authority))
            .collect())
    }

    /// Subject of `token`.
    ///
    /// # Errors
    /// * `InvalidSignature` / `Malformed` / `UnsupportedAlgorithm` - Token cannot be verified
    /// * `MissingClaim` - Subject absent or blank
    pub fn extract_username(&self, token: &str) -> Result<String, JwtError> {
        let claims: TokenClaims = self.codec.decode(token)?;

        claims
            .subject()
            .map(str::to_string)
            .ok_or_else(|| JwtError::MissingClaim("sub".to_string()))
    }
}
