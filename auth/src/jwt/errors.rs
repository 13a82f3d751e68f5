use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Missing required claim: {0}")]
    MissingClaim(String),
}

/// Error for signing key derivation at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("JWT secret cannot be empty")]
    MissingSecret,

    #[error("JWT secret must be a valid Base64 encoded string: {0}")]
    InvalidBase64(String),

    #[error("JWT secret must be at least {min} bytes long, got {actual}")]
    TooShort { min: usize, actual: usize },
}
