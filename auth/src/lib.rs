//! Token lifecycle library
//!
//! Stateless engine for signed bearer tokens:
//! - Signing key derivation from a Base64 secret (HS256, at least 256 bits)
//! - Claims codec (compact JWS)
//! - Access/refresh issuance with per-class TTLs
//! - Validation (signature, subject, expiry)
//! - Authority extraction with `ROLE_` normalization
//! - Password hashing (Argon2id) for credential verification
//!
//! The crate performs no I/O. All operations read only their inputs, the
//! shared read-only [`SigningKey`] and a [`TimeProvider`].
//!
//! # Examples
//!
//! ## Issue and validate
//! ```
//! use std::sync::Arc;
//!
//! use auth::{Principal, SigningKey, TokenManager, TokenPolicy};
//!
//! // 32 bytes of 'k', Base64 encoded
//! let secret = "a2tra2tra2tra2tra2tra2tra2tra2tra2tra2tra2s=";
//! let key = Arc::new(SigningKey::from_base64_secret(Some(secret)).unwrap());
//! let policy = TokenPolicy::from_millis(900_000, 604_800_000).unwrap();
//! let tokens = TokenManager::new(key, policy);
//!
//! let principal = Principal::new("alice@example.com", ["USER"]);
//! let pair = tokens.issue_pair(&principal).unwrap();
//!
//! assert!(tokens.is_valid(&pair.access_token));
//! assert_eq!(tokens.extract_username(&pair.refresh_token).unwrap(), "alice@example.com");
//! assert_eq!(tokens.extract_authorities(&pair.access_token).unwrap(), vec!["ROLE_USER"]);
//! ```
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```

pub mod clock;
pub mod jwt;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use clock::FixedTimeProvider;
pub use clock::SystemTimeProvider;
pub use clock::TimeProvider;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::KeyError;
pub use jwt::SigningKey;
pub use jwt::TokenClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::normalize_authority;
pub use token::PolicyError;
pub use token::Principal;
pub use token::TokenClass;
pub use token::TokenManager;
pub use token::TokenPair;
pub use token::TokenPolicy;
