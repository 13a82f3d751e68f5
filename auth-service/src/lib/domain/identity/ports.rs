use async_trait::async_trait;
use auth::Principal;
use auth::TokenPair;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::LoginCommand;
use crate::domain::identity::models::RefreshCommand;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::Role;
use crate::identity::errors::AuthError;

/// Port for the registration, login and refresh flows.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new identity and issue its first token pair.
    ///
    /// # Arguments
    /// * `command` - Validated email and password
    ///
    /// # Returns
    /// Access and refresh tokens for the new identity
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Email is already registered
    /// * `Configuration` - Default role is missing from the store
    /// * `DatabaseError` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<TokenPair, AuthError>;

    /// Verify credentials and issue a token pair.
    ///
    /// # Arguments
    /// * `command` - Email and password as submitted
    ///
    /// # Returns
    /// Access and refresh tokens carrying current authorities
    ///
    /// # Errors
    /// * `BadCredentials` - Unknown email or wrong password
    async fn login(&self, command: LoginCommand) -> Result<TokenPair, AuthError>;

    /// Exchange a valid refresh token for a fresh token pair.
    ///
    /// # Arguments
    /// * `command` - Refresh token as submitted
    ///
    /// # Returns
    /// New access and refresh tokens bound to the same subject
    ///
    /// # Errors
    /// * `InvalidToken` - Token is forged, malformed, expired, or its subject no longer exists
    async fn refresh(&self, command: RefreshCommand) -> Result<TokenPair, AuthError>;

    /// Whether `token` is signed by us, has a subject and is unexpired.
    fn validate(&self, token: &str) -> bool;

    /// Whether `token` is valid and issued to `principal`.
    fn validate_for(&self, token: &str, principal: &Principal) -> bool;
}

/// Persistence operations for identities and roles.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// Check whether an identity exists for `email`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, AuthError>;

    /// Retrieve an identity with its roles and permissions.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError>;

    /// Persist a new identity and its role grants.
    ///
    /// Must reject a second identity for the same email even when two
    /// registrations race past `exists_by_email`.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn save(&self, identity: Identity) -> Result<Identity, AuthError>;

    /// Retrieve a role with its permissions by name.
    ///
    /// # Returns
    /// Optional role (None if not seeded)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_role(&self, name: &str) -> Result<Option<Role>, AuthError>;
}

/// Checks submitted credentials against stored identities.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Authenticate `email` with `password`.
    ///
    /// # Returns
    /// Authenticated identity
    ///
    /// # Errors
    /// * `BadCredentials` - Unknown email or wrong password, indistinguishably
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
}
