use auth::PasswordError;
use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email cannot be empty")]
    Empty,

    #[error("Invalid email format")]
    InvalidFormat,
}

/// Error for Password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password cannot be empty")]
    Empty,

    #[error("Password must be at least {min} characters long")]
    TooShort { min: usize, actual: usize },
}

/// Input shape violations collected across all fields of a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", .messages.join(", "))]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn single(message: impl ToString) -> Self {
        Self::new(vec![message.to_string()])
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl From<EmailError> for ValidationError {
    fn from(err: EmailError) -> Self {
        Self::single(err)
    }
}

impl From<PasswordPolicyError> for ValidationError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::single(err)
    }
}

/// Top-level error for registration, login and refresh.
///
/// Carries no transport semantics; the HTTP adapter maps each variant to a
/// status code.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Startup and wiring faults
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Caller errors
    #[error("Email is already registered: {0}")]
    DuplicateIdentity(String),

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<EmailError> for AuthError {
    fn from(err: EmailError) -> Self {
        AuthError::Validation(err.into())
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.into())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Unknown(err.to_string())
    }
}
