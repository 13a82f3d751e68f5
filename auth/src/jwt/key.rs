use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::KeyError;

/// Symmetric HMAC key shared by the issuer and the validator.
///
/// Derived once at startup from the configured Base64 secret and shared
/// read-only (`Arc<SigningKey>`) for the lifetime of the process.
pub struct SigningKey {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    length: usize,
}

impl SigningKey {
    /// Minimum decoded key length for HS256 (256 bits).
    pub const MIN_LENGTH: usize = 32;

    /// Derive the signing key from a Base64-encoded secret.
    ///
    /// # Arguments
    /// * `secret` - Configured secret, `None` when absent from configuration
    ///
    /// # Returns
    /// Signing key ready for HS256
    ///
    /// # Errors
    /// * `MissingSecret` - Secret is absent or blank
    /// * `InvalidBase64` - Secret is not standard Base64
    /// * `TooShort` - Decoded secret is shorter than 32 bytes
    pub fn from_base64_secret(secret: Option<&str>) -> Result<Self, KeyError> {
        let secret = secret
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(KeyError::MissingSecret)?;

        let bytes = STANDARD
            .decode(secret)
            .map_err(|e| KeyError::InvalidBase64(e.to_string()))?;

        let key = Self::from_bytes(&bytes)?;
        tracing::info!(key_length = key.length, "JWT signing key initialized");
        Ok(key)
    }

    /// Build the signing key from raw key bytes.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 32 bytes supplied
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() < Self::MIN_LENGTH {
            return Err(KeyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            length: bytes.len(),
        })
    }

    /// Decoded key length in bytes.
    pub fn byte_length(&self) -> usize {
        self.length
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
