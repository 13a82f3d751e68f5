use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;

use crate::domain::identity::models::Identity;
use crate::domain::identity::ports::CredentialVerifier;
use crate::domain::identity::ports::IdentityStore;
use crate::identity::errors::AuthError;

/// Verifies email and password against stored Argon2 hashes.
///
/// Unknown emails and wrong passwords both yield `BadCredentials`, and both
/// pay for one hash verification.
pub struct PasswordCredentialVerifier<IS: IdentityStore> {
    store: Arc<IS>,
    password_hasher: PasswordHasher,
}

impl<IS: IdentityStore> PasswordCredentialVerifier<IS> {
    pub fn new(store: Arc<IS>) -> Self {
        Self {
            store,
            password_hasher: PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<IS: IdentityStore> CredentialVerifier for PasswordCredentialVerifier<IS> {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let Some(identity) = self.store.find_by_email(email).await? else {
            self.password_hasher.verify_dummy(password);
            return Err(AuthError::BadCredentials);
        };

        if !self
            .password_hasher
            .verify(password, &identity.password_hash)?
        {
            return Err(AuthError::BadCredentials);
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::identity::models::EmailAddress;
    use crate::domain::identity::models::Role;
    use crate::domain::identity::models::UserId;
    use crate::outbound::repositories::InMemoryIdentityStore;

    async fn verifier_with(email: &str, password: &str) -> PasswordCredentialVerifier<InMemoryIdentityStore> {
        let store = Arc::new(InMemoryIdentityStore::with_default_roles());
        store
            .save(Identity {
                id: UserId::new(),
                email: EmailAddress::new(email.to_string()).unwrap(),
                password_hash: PasswordHasher::new().hash(password).unwrap(),
                roles: vec![Role::new("USER", vec![])],
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        PasswordCredentialVerifier::new(store)
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let verifier = verifier_with("a@x.com", "password123").await;

        let identity = verifier
            .authenticate("a@x.com", "password123")
            .await
            .unwrap();
        assert_eq!(identity.email.as_str(), "a@x.com");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let verifier = verifier_with("a@x.com", "password123").await;

        let result = verifier.authenticate("a@x.com", "wrong-password").await;
        assert!(matches!(result.unwrap_err(), AuthError::BadCredentials));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let verifier = verifier_with("a@x.com", "password123").await;

        let result = verifier.authenticate("nobody@x.com", "password123").await;
        assert!(matches!(result.unwrap_err(), AuthError::BadCredentials));
    }
}
