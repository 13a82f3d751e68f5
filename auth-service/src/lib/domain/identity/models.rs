use std::fmt;
use std::str::FromStr;

use auth::Principal;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::identity::errors::EmailError;
use crate::identity::errors::PasswordPolicyError;
use crate::identity::errors::ValidationError;

/// Registered identity with its granted roles.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Authorities granted to this identity.
    ///
    /// Every role as `ROLE_<NAME>` followed by every permission name,
    /// deduplicated in first-seen order.
    pub fn authorities(&self) -> Vec<String> {
        let role_authorities = self.roles.iter().map(|role| role.authority());
        let permission_authorities = self
            .roles
            .iter()
            .flat_map(|role| role.permissions.iter().map(|p| p.name.clone()));

        let mut authorities: Vec<String> = Vec::new();
        for authority in role_authorities.chain(permission_authorities) {
            if !authorities.contains(&authority) {
                authorities.push(authority);
            }
        }
        authorities
    }

    /// Principal to mint tokens for.
    pub fn principal(&self) -> Principal {
        Principal::new(self.email.as_str(), self.authorities())
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Named role with its permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(name: impl ToString, permissions: Vec<Permission>) -> Self {
        Self {
            name: name.to_string(),
            permissions,
        }
    }

    /// Role rendered as an enforceable authority.
    pub fn authority(&self) -> String {
        auth::normalize_authority(&self.name)
    }
}

/// Fine-grained capability attached to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub name: String,
}

impl Permission {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Email address type, the unique identity key.
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `Empty` - Email is blank
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        if email.trim().is_empty() {
            return Err(EmailError::Empty);
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|_| EmailError::InvalidFormat)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that satisfies the registration policy.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;

    /// Validate a new password.
    ///
    /// # Errors
    /// * `Empty` - Password is blank
    /// * `TooShort` - Fewer than 6 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.trim().is_empty() {
            return Err(PasswordPolicyError::Empty);
        }

        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }

        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Where refreshed tokens take their authorities from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthoritySource {
    /// Re-read the identity's current roles; revocations apply on refresh.
    #[default]
    Reload,
    /// Reuse the authorities embedded in the refresh token.
    Token,
}

/// Orchestrator policy knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// Role granted to every new registration
    pub default_role: String,
    pub refresh_authorities: AuthoritySource,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            default_role: "USER".to_string(),
            refresh_authorities: AuthoritySource::Reload,
        }
    }
}

/// Command to register a new identity with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
}

impl RegisterCommand {
    /// Validate raw registration input, reporting every failing field.
    pub fn new(email: String, password: String) -> Result<Self, ValidationError> {
        let email = EmailAddress::new(email);
        let password = Password::new(password);

        match (email, password) {
            (Ok(email), Ok(password)) => Ok(Self { email, password }),
            (email, password) => Err(ValidationError::new(
                email
                    .err()
                    .map(|e| e.to_string())
                    .into_iter()
                    .chain(password.err().map(|e| e.to_string()))
                    .collect(),
            )),
        }
    }
}

/// Command to log in with raw credentials.
///
/// Only blankness is checked; anything else is the verifier's concern.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: String, password: String) -> Result<Self, ValidationError> {
        let mut messages = Vec::new();
        if email.trim().is_empty() {
            messages.push(EmailError::Empty.to_string());
        }
        if password.trim().is_empty() {
            messages.push(PasswordPolicyError::Empty.to_string());
        }

        if messages.is_empty() {
            Ok(Self { email, password })
        } else {
            Err(ValidationError::new(messages))
        }
    }
}

/// Command to exchange a refresh token for a new token pair.
#[derive(Debug)]
pub struct RefreshCommand {
    pub refresh_token: String,
}

impl RefreshCommand {
    pub fn new(refresh_token: String) -> Result<Self, ValidationError> {
        if refresh_token.trim().is_empty() {
            return Err(ValidationError::single("Refresh token cannot be empty"));
        }
        Ok(Self { refresh_token })
    }
}
