use std::sync::Arc;

use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::JwtError;
use super::key::SigningKey;

/// Compact JWS codec for token payloads.
///
/// Generic over the claims type. Signs and verifies with HS256 only; any
/// other `alg` in a presented header is rejected. Expiry is not checked
/// here, that belongs to the validator layered on top.
#[derive(Debug, Clone)]
pub struct JwtHandler {
    key: Arc<SigningKey>,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a codec over a shared signing key.
    ///
    /// # Arguments
    /// * `key` - Signing key derived at startup
    ///
    /// # Returns
    /// JwtHandler configured with HS256
    pub fn new(key: Arc<SigningKey>) -> Self {
        Self {
            key,
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed `header.payload.signature` token.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode (must implement Serialize)
    ///
    /// # Returns
    /// URL-safe JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, self.key.encoding_key())
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify the signature of a token and decode its claims.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidSignature` - MAC does not match the signing key
    /// * `UnsupportedAlgorithm` - Header names an algorithm other than HS256
    /// * `Malformed` - Token structure, Base64 or JSON is invalid
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let token_data = decode::<T>(token, self.key.decoding_key(), &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::MissingAlgorithm => JwtError::UnsupportedAlgorithm,
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::Malformed(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation
    }
}
