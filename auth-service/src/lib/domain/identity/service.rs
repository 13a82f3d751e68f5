use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::Principal;
use auth::TokenManager;
use auth::TokenPair;
use chrono::Utc;

use crate::domain::identity::models::AuthSettings;
use crate::domain::identity::models::AuthoritySource;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::LoginCommand;
use crate::domain::identity::models::RefreshCommand;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::UserId;
use crate::identity::errors::AuthError;
use crate::identity::ports::AuthServicePort;
use crate::identity::ports::CredentialVerifier;
use crate::identity::ports::IdentityStore;

/// Auth orchestrator.
///
/// Each flow is request-scoped; no state is kept between calls. Token work is
/// delegated to the shared [`TokenManager`], identity lookups to the store,
/// and credential checks to the verifier.
pub struct AuthService<IS, CV>
where
    IS: IdentityStore,
    CV: CredentialVerifier,
{
    store: Arc<IS>,
    verifier: Arc<CV>,
    tokens: Arc<TokenManager>,
    password_hasher: PasswordHasher,
    settings: AuthSettings,
}

impl<IS, CV> AuthService<IS, CV>
where
    IS: IdentityStore,
    CV: CredentialVerifier,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Identity persistence implementation
    /// * `verifier` - Credential verification implementation
    /// * `tokens` - Token lifecycle engine built at startup
    /// * `settings` - Default role and refresh authority sourcing
    ///
    /// # Returns
    /// Configured auth service instance
    pub fn new(
        store: Arc<IS>,
        verifier: Arc<CV>,
        tokens: Arc<TokenManager>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            store,
            verifier,
            tokens,
            password_hasher: PasswordHasher::new(),
            settings,
        }
    }

    fn issue_pair(&self, principal: &Principal) -> Result<TokenPair, AuthError> {
        self.tokens.issue_pair(principal).map_err(|e| {
            tracing::error!(subject = %principal.subject, error = %e, "Token issuance failed");
            AuthError::Unknown(format!("Token issuance failed: {}", e))
        })
    }

    fn reject_token(reason: impl std::fmt::Display) -> AuthError {
        tracing::warn!(reason = %reason, "Refresh token rejected");
        AuthError::InvalidToken
    }
}

#[async_trait]
impl<IS, CV> AuthServicePort for AuthService<IS, CV>
where
    IS: IdentityStore,
    CV: CredentialVerifier,
{
    async fn register(&self, command: RegisterCommand) -> Result<TokenPair, AuthError> {
        if self.store.exists_by_email(&command.email).await? {
            tracing::warn!(email = %command.email, "Registration rejected, email already registered");
            return Err(AuthError::DuplicateIdentity(command.email.to_string()));
        }

        let default_role = self
            .store
            .find_role(&self.settings.default_role)
            .await?
            .ok_or_else(|| {
                tracing::error!(
                    role = %self.settings.default_role,
                    "Default role not found, run database migrations first"
                );
                AuthError::Configuration(format!(
                    "Default role '{}' not found",
                    self.settings.default_role
                ))
            })?;

        let password_hash = self.password_hasher.hash(command.password.expose())?;

        let identity = Identity {
            id: UserId::new(),
            email: command.email,
            password_hash,
            roles: vec![default_role],
            created_at: Utc::now(),
        };

        let saved = self.store.save(identity).await?;
        tracing::info!(user_id = %saved.id, email = %saved.email, "Identity registered");

        self.issue_pair(&saved.principal())
    }

    async fn login(&self, command: LoginCommand) -> Result<TokenPair, AuthError> {
        let identity = self
            .verifier
            .authenticate(&command.email, &command.password)
            .await
            .map_err(|e| {
                if matches!(e, AuthError::BadCredentials) {
                    tracing::warn!(email = %command.email, "Login failed");
                }
                e
            })?;

        self.issue_pair(&identity.principal())
    }

    async fn refresh(&self, command: RefreshCommand) -> Result<TokenPair, AuthError> {
        let token = command.refresh_token.as_str();

        self.tokens.validate(token).map_err(Self::reject_token)?;
        let subject = self
            .tokens
            .extract_username(token)
            .map_err(Self::reject_token)?;

        let principal = match self.settings.refresh_authorities {
            AuthoritySource::Reload => self
                .store
                .find_by_email(&subject)
                .await?
                .ok_or_else(|| Self::reject_token(format!("identity {} no longer exists", subject)))?
                .principal(),
            AuthoritySource::Token => {
                let authorities = self
                    .tokens
                    .extract_authorities(token)
                    .map_err(Self::reject_token)?;
                Principal::new(subject, authorities)
            }
        };

        self.issue_pair(&principal)
    }

    fn validate(&self, token: &str) -> bool {
        self.tokens.is_valid(token)
    }

    fn validate_for(&self, token: &str, principal: &Principal) -> bool {
        self.tokens.is_valid_for(token, &principal.subject)
    }
}
